// Lenient field decoders.
//
// PVE is loosely typed on the wire: booleans arrive as `0`/`1` (sometimes as
// strings), numeric ids occasionally as strings, and list-valued options as
// comma-separated text. These helpers accept every encoding seen in practice
// and are wired in with `#[serde(deserialize_with = ...)]`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Flag {
    fn truthy<E: de::Error>(self) -> Result<bool, E> {
        match self {
            Self::Bool(b) => Ok(b),
            Self::Int(n) => Ok(n != 0),
            Self::Float(n) => Ok(n != 0.0),
            Self::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" | "" => Ok(false),
                other => Err(E::custom(format!("invalid boolean flag `{other}`"))),
            },
        }
    }
}

/// `0`/`1`/`true`/`"1"` → `bool`; absent or null is `false`.
pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    match Option::<Flag>::deserialize(deserializer)? {
        Some(flag) => flag.truthy(),
        None => Ok(false),
    }
}

/// Like [`flag`], but keeps "absent" distinct from "false".
pub fn opt_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    Option::<Flag>::deserialize(deserializer)?
        .map(Flag::truthy)
        .transpose()
}

/// Encode a flag the way PVE expects it in request bodies.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn flag_as_int<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

#[allow(clippy::ref_option, clippy::trivially_copy_pass_by_ref)]
pub fn opt_flag_as_int<S: Serializer>(
    value: &Option<bool>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => serializer.serialize_u8(u8::from(*v)),
        None => serializer.serialize_none(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(u64),
    Float(f64),
    Str(String),
}

/// Unsigned integer sent as a number or a numeric string.
pub fn lenient_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let raw = match Numeric::deserialize(deserializer)? {
        Numeric::Int(n) => n,
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::as_conversions
        )]
        Numeric::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => f as u64,
        Numeric::Float(f) => return Err(de::Error::custom(format!("expected an integer, got {f}"))),
        Numeric::Str(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("expected an integer, got `{s}`")))?,
    };
    u32::try_from(raw).map_err(|_| de::Error::custom(format!("{raw} out of range")))
}

pub fn opt_lenient_u32<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    struct Wrap(#[serde(deserialize_with = "lenient_u32")] u32);

    Ok(Option::<Wrap>::deserialize(deserializer)?.map(|Wrap(n)| n))
}

/// Float that may be sent as a string (`loadavg` is `["0.12","0.08","0.03"]`).
pub fn lenient_f64_seq<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
    Option::<Vec<Numeric>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(|n| match n {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            Numeric::Int(i) => Ok(i as f64),
            Numeric::Float(f) => Ok(f),
            Numeric::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| de::Error::custom(format!("expected a number, got `{s}`"))),
        })
        .collect()
}

/// `"images,rootdir,iso"` → `["images", "rootdir", "iso"]`.
pub fn comma_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default())
}
