//! 配置基础设施
//!
//! 所有配置均来自环境变量，缺省时使用内置默认值。

use sqlx::postgres::PgConnectOptions;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// 应用配置
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// HTTP 监听端口
    pub port: u16,
    /// 数据库配置
    pub database: DatabaseConfig,
    /// 静态资源目录
    pub static_dir: PathBuf,
    /// 日志级别 (trace, debug, info, warn, error)
    pub log_level: String,
}

/// 数据库连接配置
#[derive(Clone, PartialEq)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub password: String,
    pub name: String,
    pub port: u16,
    /// 连接或建表失败后的重试间隔
    pub retry_delay: Duration,
}

// 避免把密码打进日志
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("port", &self.port)
            .field("retry_delay", &self.retry_delay)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database: DatabaseConfig::default(),
            static_dir: PathBuf::from("public"),
            log_level: "info".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            name: "postgres".to_string(),
            port: 5432,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl AppConfig {
    /// 从进程环境变量读取配置
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键值来源读取配置，便于测试时不依赖进程环境
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let db = defaults.database;

        let retry_ms = parse_or(&lookup, "DB_RETRY_DELAY_MS", db.retry_delay.as_millis() as u64);

        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            database: DatabaseConfig {
                host: lookup("DB_HOST").unwrap_or(db.host),
                user: lookup("DB_USER").unwrap_or(db.user),
                password: lookup("DB_PASSWORD").unwrap_or(db.password),
                name: lookup("DB_NAME").unwrap_or(db.name),
                port: parse_or(&lookup, "DB_PORT", db.port),
                retry_delay: Duration::from_millis(retry_ms),
            },
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl DatabaseConfig {
    pub fn pg_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value {:?} for {}, using default {}", raw, key, default);
            default
        }),
        None => default,
    }
}
