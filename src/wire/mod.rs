/*
 * Responsibility
 * - ドメイン値 <-> 署名可能なプレーンデータ (serde_json::Value) の変換契約
 * - 複合型の Wire は、内側の型の Wire を構築時に受け取る (継承ではなく注入)
 * - 形式エラーは WireError に集約し、engine 側で TokenError に包む
 */
use std::fmt;
use std::marker::PhantomData;

use serde_json::{Map, Value};
use thiserror::Error;

pub type WireResult<T> = Result<T, WireError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("wire is not implemented for this type")]
    NotImplemented,
    #[error("expected a JSON object")]
    NotAnObject,
    #[error("missing field '{0}'")]
    MissingField(&'static str),
    #[error("field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// Bidirectional mapping between a domain value and plain JSON data.
///
/// `decode(encode(v)) == v` must hold for every well-formed `v`.
pub trait Wire: Send + Sync + 'static {
    type Value: Send + Sync + 'static;

    fn encode(&self, value: &Self::Value) -> WireResult<Value>;

    fn decode(&self, plain: &Value) -> WireResult<Self::Value>;
}

/// Placeholder wire that refuses both directions.
pub struct UnimplementedWire<T>(PhantomData<fn() -> T>);

impl<T> UnimplementedWire<T> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for UnimplementedWire<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for UnimplementedWire<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnimplementedWire")
    }
}

impl<T: Send + Sync + 'static> Wire for UnimplementedWire<T> {
    type Value = T;

    fn encode(&self, _value: &T) -> WireResult<Value> {
        Err(WireError::NotImplemented)
    }

    fn decode(&self, _plain: &Value) -> WireResult<T> {
        Err(WireError::NotImplemented)
    }
}

pub fn as_object(plain: &Value) -> WireResult<&Map<String, Value>> {
    plain.as_object().ok_or(WireError::NotAnObject)
}

fn field<'a>(obj: &'a Map<String, Value>, name: &'static str) -> WireResult<&'a Value> {
    obj.get(name).ok_or(WireError::MissingField(name))
}

pub fn string_field(obj: &Map<String, Value>, name: &'static str) -> WireResult<String> {
    field(obj, name)?
        .as_str()
        .map(str::to_owned)
        .ok_or(WireError::WrongType {
            field: name,
            expected: "a string",
        })
}

pub fn bool_field(obj: &Map<String, Value>, name: &'static str) -> WireResult<bool> {
    field(obj, name)?.as_bool().ok_or(WireError::WrongType {
        field: name,
        expected: "a boolean",
    })
}

pub fn array_field<'a>(
    obj: &'a Map<String, Value>,
    name: &'static str,
) -> WireResult<&'a Vec<Value>> {
    field(obj, name)?.as_array().ok_or(WireError::WrongType {
        field: name,
        expected: "an array",
    })
}
