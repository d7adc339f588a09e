//! 产品数据模型

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: i32,
    pub name: String,
    /// NUMERIC 原样保存，JSON 中以字符串输出
    pub price: Decimal,
    pub created_at: Option<NaiveDateTime>,
}

/// 待插入的产品
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: Decimal,
}

/// 创建产品请求
///
/// 字段保留原始 JSON 值：任何"假值"（缺失、null、false、0、空串）都视为缺失。
/// 因此 `price: 0` 会被拒绝。
#[derive(Debug, Default, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
}

impl CreateProductRequest {
    /// 校验并转换为可插入的记录
    pub fn into_new_product(self) -> Result<NewProduct, ValidationErrors> {
        self.parse()
    }

    fn parse(&self) -> Result<NewProduct, ValidationErrors> {
        let name = self.name.as_ref().filter(|v| is_truthy(v)).and_then(name_of);
        let price = self.price.as_ref().filter(|v| is_truthy(v)).and_then(price_of);

        match (name, price) {
            (Some(name), Some(price)) => Ok(NewProduct { name, price }),
            (name, price) => {
                let mut errors = ValidationErrors::new();
                if name.is_none() {
                    errors.add("name", ValidationError::new("required"));
                }
                if price.is_none() {
                    errors.add("price", ValidationError::new("required"));
                }
                Err(errors)
            }
        }
    }
}

impl Validate for CreateProductRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.parse().map(|_| ())
    }
}

/// 与 JavaScript 相同的真值判断
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn name_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

// 数字字符串按十进制原样解析；"0" 是真值，会以 0 入库
fn price_of(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
