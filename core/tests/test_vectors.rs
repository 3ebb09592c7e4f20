//! Verify parameter encoding against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names a base URL, a path, a destination, and an ordered list of
//! `param` calls, plus the exact URL, body, and content type `build` must
//! produce.

use netkit::{HttpMethod, ParamValue, ParameterEncoding, RequestBuilder};
use url::Url;

/// Convert a JSON scalar from a vector file into a `ParamValue`.
fn param_value(value: &serde_json::Value) -> ParamValue {
    match value {
        serde_json::Value::String(s) => ParamValue::from(s.as_str()),
        serde_json::Value::Bool(b) => ParamValue::from(*b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ParamValue::from(i)
            } else if let Some(u) = n.as_u64() {
                ParamValue::from(u)
            } else {
                ParamValue::from(n.as_f64().unwrap())
            }
        }
        other => panic!("unsupported parameter value: {other}"),
    }
}

fn parse_encoding(s: &str) -> ParameterEncoding {
    match s {
        "query" => ParameterEncoding::query_string(),
        "body" => ParameterEncoding::http_body(),
        other => panic!("unknown destination: {other}"),
    }
}

#[test]
fn encoding_test_vectors() {
    let raw = include_str!("../../test-vectors/encoding.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let base = Url::parse(case["base_url"].as_str().unwrap()).unwrap();
        let encoding = parse_encoding(case["destination"].as_str().unwrap());

        let mut builder = RequestBuilder::new(&base, case["path"].as_str().unwrap(), encoding);
        for pair in case["params"].as_array().unwrap() {
            let pair = pair.as_array().unwrap();
            builder = builder.param(pair[0].as_str().unwrap(), param_value(&pair[1]));
        }

        let req = builder.build();
        assert_eq!(req.method, HttpMethod::Get, "{name}: method");
        assert_eq!(req.url.as_str(), case["expected_url"].as_str().unwrap(), "{name}: url");

        let body = req.body.as_deref().map(|b| std::str::from_utf8(b).unwrap());
        assert_eq!(body, case["expected_body"].as_str(), "{name}: body");
        assert_eq!(
            req.header("content-type"),
            case["expected_content_type"].as_str(),
            "{name}: content type"
        );

        assert_eq!(builder.build(), req, "{name}: build is idempotent");
    }
}
