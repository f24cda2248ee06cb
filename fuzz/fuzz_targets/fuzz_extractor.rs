#![no_main]
use std::{cell::RefCell, io::Read};

use arbitrary::Arbitrary;
use jsonpick::{ErrorKind, Extractor, ExtractorOptions, Path};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde_json::{Map, Value};

/// 1 byte window size, 4 byte split seed, 1 byte path length.
const HEADER: usize = 6;

/// Keys and path segments are drawn from here so that paths actually hit.
const NAMES: &[&str] = &["a", "b", "0", "1", "2", ""];

thread_local! {
    static RNG: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

static WS_TABLE: &[&[u8]] = &[b" ", b"\t", b"\n", b"\r"];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8);
        data[1..5].copy_from_slice(&with_rng(|rng| rng.next_u32().to_le_bytes()));

        let path = random_path();
        let path_len = path.len().min(max_size.saturating_sub(HEADER)).min(255);
        data[5] = path_len as u8;
        data[HEADER..HEADER + path_len].copy_from_slice(&path.as_bytes()[..path_len]);

        let mut prefix = HEADER + path_len;
        while prefix < size {
            let limit = max_size - prefix;

            prefix += append_value(&mut data[prefix..], size, limit);
            prefix += append_whitespace(&mut data[prefix..], max_size - prefix);
        }

        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fn random_path() -> String {
    with_rng(|rng| {
        let segments = rng.random_range(0..4);
        let names: Vec<&str> = (0..segments)
            .map(|_| NAMES[rng.random_range(0..NAMES.len())])
            .collect();
        names.join(".")
    })
}

/// Append 1 to 8 JSON whitespace bytes, never exceeding `limit`.
fn append_whitespace(buf: &mut [u8], limit: usize) -> usize {
    with_rng(|rng| {
        if limit == 0 {
            return 0;
        }

        let n = rng.random_range(1..=limit.min(8));
        for byte in &mut buf[..n] {
            *byte = WS_TABLE[rng.random_range(0..WS_TABLE.len())][0];
        }
        n
    })
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2 + 1).min(limit));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryValue::arbitrary(&mut arbitrary::Unstructured::new(&bytes)) {
            break value;
        }
    };

    let serialized = serde_json::to_vec(&value.0).expect("Failed to serialize arbitrary value");

    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized[..len]);

    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryValue(Value);

impl<'a> Arbitrary<'a> for ArbitraryValue {
    fn arbitrary(u: &mut arbitrary::Unstructured<'_>) -> arbitrary::Result<Self> {
        let value = match u.choose_index(21)? {
            0 => Value::Null,
            1 => Value::Bool(u.arbitrary()?),
            2 => {
                let n: f64 = u.arbitrary()?;
                Value::Number(
                    serde_json::Number::from_f64(n).ok_or(arbitrary::Error::IncorrectFormat)?,
                )
            }
            3..=10 => Value::String(u.arbitrary()?),
            11..=15 => {
                let elems: Vec<ArbitraryValue> = u.arbitrary()?;
                Value::Array(elems.into_iter().map(|v| v.0).collect())
            }
            16..=20 => {
                let m: Vec<(usize, ArbitraryValue)> = u.arbitrary()?;
                Value::Object(Map::from_iter(
                    m.into_iter()
                        .map(|(k, v)| (NAMES[k % NAMES.len()].to_string(), v.0)),
                ))
            }
            _ => Err(arbitrary::Error::IncorrectFormat)?,
        };
        Ok(ArbitraryValue(value))
    }
}

/// Reader that splits its input at sizes derived from a seed.
struct Split<'a> {
    input: &'a [u8],
    seed: u64,
}

impl Read for Split<'_> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.seed = self.seed.rotate_left(7) ^ 0x9E37_79B9_7F4A_7C15;
        let size = (self.seed as usize % 64 + 1).min(buf.len()).min(self.input.len());
        buf[..size].copy_from_slice(&self.input[..size]);
        self.input = &self.input[size..];
        Ok(size)
    }
}

/// In-memory lookup over a decoded document. `Err` means a segment was used
/// as an array index and is not one.
fn lookup(mut value: &Value, path: &Path) -> Result<Value, ()> {
    for segment in path.segments() {
        value = match value {
            Value::Object(members) => match members.get(segment.as_str()) {
                Some(member) => member,
                None => return Ok(Value::Null),
            },
            Value::Array(items) => {
                let index: usize = segment.as_str().parse().map_err(|_| ())?;
                match items.get(index) {
                    Some(item) => item,
                    None => return Ok(Value::Null),
                }
            }
            _ => return Ok(Value::Null),
        };
    }
    Ok(value.clone())
}

/// Structural equality with numbers compared to within rounding, since the
/// two decoders may round long mantissas differently.
fn same(a: &jsonpick::Value, b: &jsonpick::Value) -> bool {
    use jsonpick::Value as V;
    match (a, b) {
        (V::Number(x), V::Number(y)) => x == y || (x - y).abs() <= f64::EPSILON * x.abs().max(y.abs()),
        (V::Array(xs), V::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| same(x, y))
        }
        (V::Object(xs), V::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().zip(ys).all(|((kx, x), (ky, y))| kx == ky && same(x, y))
        }
        _ => a == b,
    }
}

fn extractor(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let buffer_capacity = usize::from(data[0]);
    let split_seed = u64::from(u32::from_le_bytes(data[1..5].try_into().unwrap()));
    let path_len = usize::from(data[5]).min(data.len() - HEADER);
    let path = Path::parse(&String::from_utf8_lossy(&data[HEADER..HEADER + path_len]));
    let input = &data[HEADER + path_len..];

    let options = ExtractorOptions {
        buffer_capacity,
        retain_raw_input: data[0] & 1 != 0,
    };
    let reader = Split {
        input,
        seed: split_seed,
    };
    let got: Vec<_> = Extractor::with_options(reader, path.clone(), options).collect();

    // Escapes other than `\"` and `\\` are not decoded, so only
    // backslash-free streams are comparable with a full decoder.
    if input.contains(&b'\\') {
        return;
    }
    let Ok(docs) = serde_json::Deserializer::from_slice(input)
        .into_iter::<Value>()
        .collect::<Result<Vec<_>, _>>()
    else {
        return;
    };

    for (i, doc) in docs.iter().enumerate() {
        match (lookup(doc, &path), got.get(i)) {
            (Ok(expected), Some(Ok(value))) => {
                let expected: jsonpick::Value = serde_json::from_value(expected).unwrap();
                assert!(same(&expected, value), "document {i}: {expected} != {value}");
            }
            (Err(()), Some(Err(err))) => {
                assert!(matches!(err.kind(), ErrorKind::InvalidIndex(_)), "{err}");
                return;
            }
            (expected, actual) => panic!("document {i}: expected {expected:?}, got {actual:?}"),
        }
    }
    assert_eq!(got.len(), docs.len());
}

fuzz_target!(|data: &[u8]| extractor(data));
