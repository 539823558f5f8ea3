//! Call descriptors: which contract, which method, which typed arguments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::pipeline::amount::{Amount, AmountError};

/// A typed contract argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScArg {
    Bool(bool),
    U32(u32),
    I32(i32),
    U64(#[serde(with = "int_string")] u64),
    I64(#[serde(with = "int_string")] i64),
    I128(#[serde(with = "int_string")] i128),
    Symbol(String),
    String(String),
    Address(String),
}

impl ScArg {
    /// Amount argument, carried as a scaled `i128`.
    pub fn amount(amount: Amount) -> Self {
        Self::I128(amount.raw())
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Self::Symbol(s.into())
    }

    pub fn address(s: impl Into<String>) -> Self {
        Self::Address(s.into())
    }
}

impl From<Amount> for ScArg {
    fn from(amount: Amount) -> Self {
        Self::amount(amount)
    }
}

impl fmt::Display for ScArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "bool:{}", v),
            Self::U32(v) => write!(f, "u32:{}", v),
            Self::I32(v) => write!(f, "i32:{}", v),
            Self::U64(v) => write!(f, "u64:{}", v),
            Self::I64(v) => write!(f, "i64:{}", v),
            Self::I128(v) => write!(f, "i128:{}", v),
            Self::Symbol(v) => write!(f, "symbol:{}", v),
            Self::String(v) => write!(f, "string:{}", v),
            Self::Address(v) => write!(f, "address:{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgParseError {
    #[error("argument '{0}' must look like <type>:<value>")]
    MissingType(String),

    #[error("unknown argument type '{0}'")]
    UnknownType(String),

    #[error("invalid {kind} value '{value}'")]
    InvalidValue { kind: &'static str, value: String },

    #[error(transparent)]
    Amount(#[from] AmountError),
}

impl FromStr for ScArg {
    type Err = ArgParseError;

    /// Parse `<type>:<value>`, e.g. `symbol:XLM`, `i128:100`, `amount:1.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s
            .split_once(':')
            .ok_or_else(|| ArgParseError::MissingType(s.to_string()))?;

        fn num<T: FromStr>(kind: &'static str, value: &str) -> Result<T, ArgParseError> {
            value.parse().map_err(|_| ArgParseError::InvalidValue {
                kind,
                value: value.to_string(),
            })
        }

        Ok(match kind.to_ascii_lowercase().as_str() {
            "bool" => Self::Bool(num("bool", value)?),
            "u32" => Self::U32(num("u32", value)?),
            "i32" => Self::I32(num("i32", value)?),
            "u64" => Self::U64(num("u64", value)?),
            "i64" => Self::I64(num("i64", value)?),
            "i128" => Self::I128(num("i128", value)?),
            "amount" => Self::amount(Amount::from_human(value)?),
            "symbol" | "sym" => Self::Symbol(value.to_string()),
            "string" | "str" => Self::String(value.to_string()),
            "address" | "addr" => Self::Address(value.to_string()),
            other => return Err(ArgParseError::UnknownType(other.to_string())),
        })
    }
}

/// Contract actions whose failures get action-specific wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractAction {
    Supply,
    Withdraw,
    DepositCollateral,
    WithdrawCollateral,
    Borrow,
    Repay,
    Liquidate,
    Other,
}

impl ContractAction {
    pub fn from_method(method: &str) -> Self {
        match method {
            "supply" | "deposit" => Self::Supply,
            "withdraw" => Self::Withdraw,
            "deposit_collateral" => Self::DepositCollateral,
            "withdraw_collateral" => Self::WithdrawCollateral,
            "borrow" => Self::Borrow,
            "repay" => Self::Repay,
            "liquidate" => Self::Liquidate,
            _ => Self::Other,
        }
    }

    /// Verb used in user-facing messages.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Supply => "supply",
            Self::Withdraw => "withdraw",
            Self::DepositCollateral => "deposit",
            Self::WithdrawCollateral => "withdraw collateral",
            Self::Borrow => "borrow",
            Self::Repay => "repay",
            Self::Liquidate => "liquidate",
            Self::Other => "complete this operation",
        }
    }
}

/// A single contract invocation request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallDescriptor {
    contract_address: String,
    method: String,
    args: Vec<ScArg>,
}

impl CallDescriptor {
    pub fn new(contract_address: impl Into<String>, method: impl Into<String>, args: Vec<ScArg>) -> Self {
        Self {
            contract_address: contract_address.into(),
            method: method.into(),
            args,
        }
    }

    pub fn contract_address(&self) -> &str {
        &self.contract_address
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[ScArg] {
        &self.args
    }

    pub fn action(&self) -> ContractAction {
        ContractAction::from_method(&self.method)
    }
}

/// Wide integers travel as JSON strings.
mod int_string {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typed_args() {
        assert_eq!("symbol:XLM".parse::<ScArg>().unwrap(), ScArg::symbol("XLM"));
        assert_eq!("i128:-5".parse::<ScArg>().unwrap(), ScArg::I128(-5));
        assert_eq!("bool:true".parse::<ScArg>().unwrap(), ScArg::Bool(true));
        assert_eq!("amount:1.5".parse::<ScArg>().unwrap(), ScArg::I128(15_000_000));
        // Only the first colon separates type from value.
        assert_eq!(
            "string:a:b".parse::<ScArg>().unwrap(),
            ScArg::String("a:b".to_string())
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!("XLM".parse::<ScArg>(), Err(ArgParseError::MissingType(_))));
        assert!(matches!("float:1.0".parse::<ScArg>(), Err(ArgParseError::UnknownType(_))));
        assert!(matches!("u32:-1".parse::<ScArg>(), Err(ArgParseError::InvalidValue { .. })));
        assert!(matches!("amount:0.123456789".parse::<ScArg>(), Err(ArgParseError::Amount(_))));
    }

    #[test]
    fn test_wide_ints_serialize_as_strings() {
        let json = serde_json::to_string(&ScArg::I128(170_141_183_460_469_231_731_687_303_715_884_105_727)).unwrap();
        assert_eq!(json, r#"{"type":"i128","value":"170141183460469231731687303715884105727"}"#);
        let back: ScArg = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ScArg::I128(i128::MAX));
    }

    #[test]
    fn test_action_from_method() {
        let call = CallDescriptor::new("CPOOL", "deposit_collateral", vec![]);
        assert_eq!(call.action(), ContractAction::DepositCollateral);
        assert_eq!(ContractAction::from_method("get_price"), ContractAction::Other);
    }
}
