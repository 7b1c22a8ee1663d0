use super::*;

#[test]
fn split_location_separates_query() {
    assert_eq!(split_location("#/presensi?a=1"), ("#/presensi", Some("a=1")));
    assert_eq!(split_location("#/presensi"), ("#/presensi", None));
}

#[test]
fn parse_decodes_keys_and_values() {
    let q = parse("tglAwal=2024-01-01&nama=Budi%20Santoso&x%26y=1");
    assert_eq!(q["tglAwal"], "2024-01-01");
    assert_eq!(q["nama"], "Budi Santoso");
    assert_eq!(q["x&y"], "1");
}

#[test]
fn parse_last_duplicate_wins() {
    let q = parse("page=1&page=3");
    assert_eq!(q.len(), 1);
    assert_eq!(q["page"], "3");
}

#[test]
fn parse_keeps_plus_literal_and_missing_value_empty() {
    let q = parse("a=1+2&flag&=skipped");
    assert_eq!(q["a"], "1+2");
    assert_eq!(q["flag"], "");
    assert_eq!(q.len(), 2);
}

#[test]
fn serialize_drops_missing_values() {
    let s = serialize([("action", Some("add")), ("id", None), ("q", Some("a b"))]);
    assert_eq!(s, "action=add&q=a%20b");
}

#[test]
fn serialize_then_parse_reproduces_map() {
    let samples: Vec<QueryMap> = vec![
        QueryMap::new(),
        [("tglAwal", "2024-01-01"), ("tglAkhir", "2024-01-31")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect(),
        [("q", "a&b=c"), ("sp ace", "x y"), ("plus", "1+1"), ("utf", "Désa")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect(),
    ];
    for map in samples {
        let raw = serialize(map.iter().map(|(k, v)| (k.as_str(), Some(v.as_str()))));
        assert_eq!(parse(&raw), map);
    }
}

#[test]
fn build_location_normalizes_and_appends() {
    assert_eq!(build_location("pegawai", &[("action", Some("add"))]), "#/pegawai?action=add");
    assert_eq!(build_location("#/dashboard", &[]), "#/dashboard");
    assert_eq!(build_location("/presensi", &[("x", None)]), "#/presensi");
}

#[test]
fn build_location_keeps_inline_query() {
    assert_eq!(build_location("#/presensi?tglAwal=2024-01-01", &[]), "#/presensi?tglAwal=2024-01-01");
    assert_eq!(build_location("#/presensi?a=1", &[("b", Some("2"))]), "#/presensi?a=1&b=2");
}
