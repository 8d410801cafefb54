use serde::de::{Deserialize, Deserializer, Error};

pub fn zero<'a, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'a>,
{
    i64::deserialize(deserializer).and_then(|n| {
        if n == 0 {
            Ok(n)
        } else {
            Err(Error::custom(format!("invalid errcode: {}", n)))
        }
    })
}

#[test]
fn test_zero() {
    #[derive(Debug, PartialEq, Eq, serde::Deserialize)]
    struct T {
        #[serde(deserialize_with = "zero")]
        val: i64,
    }

    assert_eq!(
        serde_json::from_str::<T>(r#"{"val": 0}"#).unwrap(),
        T { val: 0 },
    );

    assert!(serde_json::from_str::<T>(r#"{"val": 40013}"#).is_err());
}

pub fn nonzero<'a, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'a>,
{
    i64::deserialize(deserializer).and_then(|n| {
        if n == 0 {
            Err(Error::custom("invalid errcode: 0"))
        } else {
            Ok(n)
        }
    })
}

#[test]
fn test_nonzero() {
    #[derive(Debug, PartialEq, Eq, serde::Deserialize)]
    struct T {
        #[serde(deserialize_with = "nonzero")]
        val: i64,
    }

    assert_eq!(
        serde_json::from_str::<T>(r#"{"val": 40013}"#).unwrap(),
        T { val: 40013 },
    );

    assert!(serde_json::from_str::<T>(r#"{"val": 0}"#).is_err());
}
