// Property-based checks over the codec, the JSON bridge and the pointer engine.

use proptest::prelude::*;

use cborjson::{
	decode, del, encode_to_vec, from_json_pointer_to_vec, get, prepend, set, to_json_pointer,
	to_json_string, Config, ContainerKind, Fraction, NumberKind, SpaceKind, Value,
};
use chrono::{FixedOffset, TimeZone};
use num_bigint::{BigInt, Sign};
use regex::Regex;

fn arb_leaf() -> impl Strategy<Value = Value> {
	prop_oneof![
		Just(Value::Null),
		Just(Value::Undefined),
		any::<bool>().prop_map(Value::Bool),
		any::<u64>().prop_map(Value::Unsigned),
		any::<i64>().prop_map(Value::Signed),
		any::<f32>().prop_map(Value::Float32),
		any::<f64>().prop_map(Value::Float64),
		proptest::collection::vec(any::<u8>(), 0..32).prop_map(Value::Bytes),
		".{0,16}".prop_map(Value::Text),
		prop_oneof![0u8..=19, 32u8..=255].prop_map(Value::Simple),
		any::<i64>().prop_map(Value::Epoch),
		(any::<bool>(), proptest::collection::vec(any::<u8>(), 1..24)).prop_map(|(neg, mag)| {
			let n = BigInt::from_bytes_be(Sign::Plus, &mag);
			Value::BigInt(if neg { -n } else { n })
		}),
		(any::<i64>(), any::<i64>()).prop_map(|(e, m)| Value::DecimalFraction(Fraction::new(e, m))),
		arb_tagged(),
	]
}

/// The remaining tag variants.
fn arb_tagged() -> impl Strategy<Value = Value> {
	prop_oneof![
		// RFC 3339 carries four-digit years and whole-minute offsets.
		(0i64..250_000_000_000, 0u32..1_000_000_000, -1439i32..1440).prop_map(|(secs, nanos, mins)| {
			let offset = FixedOffset::east_opt(mins * 60).unwrap();
			Value::DateTime(offset.timestamp_opt(secs, nanos).unwrap())
		}),
		any::<f64>().prop_map(Value::EpochMicro),
		(any::<i64>(), any::<i64>()).prop_map(|(e, m)| Value::BigFloat(Fraction::new(e, m))),
		proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::EmbeddedCbor),
		"[a-z0-9 .*+()]{0,8}".prop_map(|s| Value::RegExp(Regex::new(&regex::escape(&s)).unwrap())),
		proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::CborPrefix),
	]
}

fn arb_value() -> impl Strategy<Value = Value> {
	arb_leaf().prop_recursive(4, 128, 8, |inner| {
		prop_oneof![
			proptest::collection::vec(inner.clone(), 0..8).prop_map(Value::Array),
			proptest::collection::vec((inner.clone(), inner), 0..8).prop_map(Value::Map),
		]
	})
}

fn arb_json() -> impl Strategy<Value = serde_json::Value> {
	let leaf = prop_oneof![
		Just(serde_json::Value::Null),
		any::<bool>().prop_map(serde_json::Value::from),
		any::<i64>().prop_map(serde_json::Value::from),
		// Quarters survive six fractional digits exactly.
		(-4000i32..4000).prop_map(|n| serde_json::Value::from(n as f64 / 4.0)),
		".{0,12}".prop_map(serde_json::Value::from),
	];
	leaf.prop_recursive(4, 64, 6, |inner| {
		prop_oneof![
			proptest::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
			proptest::collection::btree_map("[a-z~/]{0,4}", inner, 0..6)
				.prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
		]
	})
}

fn smart() -> Config {
	Config::new(
		NumberKind::SmartNumber,
		SpaceKind::AnsiSpace,
		ContainerKind::Stream,
	)
}

fn escape(token: &str) -> String {
	token.replace('~', "~0").replace('/', "~1")
}

/// Every JSON pointer that addresses something in `json`.
fn paths(json: &serde_json::Value, prefix: String, out: &mut Vec<String>) {
	match json {
		serde_json::Value::Array(items) => {
			for (i, item) in items.iter().enumerate() {
				paths(item, format!("{}/{}", prefix, i), out);
			}
		}
		serde_json::Value::Object(entries) => {
			for (key, item) in entries {
				paths(item, format!("{}/{}", prefix, escape(key)), out);
			}
		}
		_ => (),
	}
	out.push(prefix);
}

fn get_vec(doc: &[u8], path: &str) -> Vec<u8> {
	let mut out = vec![0u8; doc.len()];
	let n = get(doc, &from_json_pointer_to_vec(path).unwrap(), &mut out).unwrap();
	out.truncate(n);
	out
}

proptest! {
	#[test]
	fn value_round_trip(v in arb_value(), stream in any::<bool>()) {
		let mut config = Config::default();
		if !stream {
			config.set_container_kind(ContainerKind::LengthPrefix);
		}
		let bytes = config.encode_to_vec(&v).unwrap();
		let (decoded, n) = decode(&bytes).unwrap();
		prop_assert_eq!(decoded, v);
		prop_assert_eq!(n, bytes.len());
	}

	#[test]
	fn minimal_width(n in any::<i64>(), u in any::<u64>()) {
		let width = |m: u64| match m {
			0..=23 => 1,
			24..=0xFF => 2,
			0x100..=0xFFFF => 3,
			0x1_0000..=0xFFFF_FFFF => 5,
			_ => 9,
		};
		let magnitude = if n < 0 { !n as u64 } else { n as u64 };
		prop_assert_eq!(encode_to_vec(&Value::Signed(n)).unwrap().len(), width(magnitude));
		prop_assert_eq!(encode_to_vec(&Value::Unsigned(u)).unwrap().len(), width(u));
	}

	#[test]
	fn pointer_round_trip(tokens in proptest::collection::vec("[a-z0-9~/]{0,6}", 0..5)) {
		let path: String = tokens.iter().map(|t| format!("/{}", escape(t))).collect();
		let cbor = from_json_pointer_to_vec(&path).unwrap();
		let mut out = vec![0u8; path.len()];
		let n = to_json_pointer(&cbor, &mut out).unwrap();
		prop_assert_eq!(&out[..n], path.as_bytes());
	}

	#[test]
	fn json_round_trip(json in arb_json()) {
		let text = json.to_string();
		let (rest, cbor) = smart().parse_json_to_vec(&text).unwrap();
		prop_assert!(rest.is_empty());
		let back: serde_json::Value = serde_json::from_str(&to_json_string(&cbor).unwrap()).unwrap();
		prop_assert_eq!(back, json);
	}

	#[test]
	fn get_equals_decode(json in arb_json()) {
		let (_, doc) = smart().parse_json_to_vec(&json.to_string()).unwrap();
		let (tree, _) = decode(&doc).unwrap();
		let mut all = Vec::new();
		paths(&json, String::new(), &mut all);
		for path in all {
			let item = get_vec(&doc, &path);
			let (value, n) = decode(&item).unwrap();
			prop_assert_eq!(n, item.len());
			prop_assert_eq!(Some(&value), tree.pointer(&path));
		}
	}

	#[test]
	fn set_with_own_value_is_identity(json in arb_json()) {
		let (_, doc) = smart().parse_json_to_vec(&json.to_string()).unwrap();
		let mut all = Vec::new();
		paths(&json, String::new(), &mut all);
		for path in all {
			let item = get_vec(&doc, &path);
			let mut new_doc = vec![0u8; doc.len()];
			let mut old = vec![0u8; doc.len()];
			let (n, o) = set(&doc, &from_json_pointer_to_vec(&path).unwrap(), &item, &mut new_doc, &mut old)
				.unwrap();
			prop_assert_eq!(&new_doc[..n], &doc[..]);
			prop_assert_eq!(&old[..o], &item[..]);
		}
	}

	#[test]
	fn del_inverts_prepend(json in arb_json()) {
		let (_, doc) = smart().parse_json_to_vec(&json.to_string()).unwrap();
		let mut all = Vec::new();
		paths(&json, String::new(), &mut all);
		for path in all {
			// An array gets a null; a map gets an empty key mapped to null.
			let (item, first): (&[u8], &str) = match get_vec(&doc, &path)[0] {
				0x9F => (&[0xF6], "/0"),
				0xBF => (&[0x60, 0xF6], "/"),
				_ => continue,
			};
			let mut grown = vec![0u8; doc.len() + item.len()];
			let n = prepend(&doc, &from_json_pointer_to_vec(&path).unwrap(), item, &mut grown).unwrap();
			let mut restored = vec![0u8; doc.len()];
			let mut deleted = [0u8; 1];
			let inserted = from_json_pointer_to_vec(&format!("{}{}", path, first)).unwrap();
			let (m, d) = del(&grown[..n], &inserted, &mut restored, &mut deleted).unwrap();
			prop_assert_eq!(&restored[..m], &doc[..]);
			prop_assert_eq!(&deleted[..d], &[0xF6]);
		}
	}
}
