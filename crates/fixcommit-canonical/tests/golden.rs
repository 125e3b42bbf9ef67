use ciborium::value::Value;
use fixcommit_canonical::{
    build_tree, canonicalize, decode, encode, extract, CanonicalTree, ExtractOptions, FieldPath,
    GroupScope, RawField, Schema,
};
use proptest::prelude::*;

const BOND: &str = "8=FIX.4.4|9=200|35=d|49=ISSUER|56=REGISTRY|34=12|52=20250101-12:00:00|\
55=UST-2034|48=US91282CJL54|22=4|167=TBOND|15=USD|223=4.250|541=20341115|\
454=2|455=91282CJL5|456=1|455=US91282CJL54|456=4|\
453=2|448=US_TREASURY|447=D|452=1|448=FED_NY|447=D|452=12|802=1|523=AGENT|803=2|\
10=123|";

fn bond_tree() -> CanonicalTree {
    canonicalize(BOND, &Schema::instrument(), &ExtractOptions::default())
        .unwrap()
        .0
}

#[test]
fn scenario_bytes_are_fixed() {
    let fields = vec![
        RawField::top(15, "USD"),
        RawField::top(223, "4.250"),
        RawField::scoped(448, "US_TREASURY", GroupScope::root().enter(453, 0)),
        RawField::scoped(452, "1", GroupScope::root().enter(453, 0)),
    ];
    let tree = build_tree(&fields, &Schema::instrument()).unwrap();
    assert_eq!(
        hex::encode(encode(&tree).unwrap()),
        concat!(
            "a3",                       // map(3)
            "0f", "63555344",           // 15: "USD"
            "18df", "65342e323530",     // 223: "4.250"
            "1901c5", "81",             // 453: array(1)
            "a2",                       // map(2)
            "1901c0", "6b55535f5452454153555259", // 448: "US_TREASURY"
            "1901c4", "6131"            // 452: "1"
        )
    );
}

#[test]
fn canonical_bytes_decode_with_a_general_cbor_library() {
    let bytes = encode(&bond_tree()).unwrap();
    let value: Value = ciborium::de::from_reader(bytes.as_slice()).unwrap();
    let Value::Map(root) = value else {
        panic!("root is not a map");
    };
    let keys: Vec<u64> = root
        .iter()
        .map(|(k, _)| match k {
            Value::Integer(i) => u64::try_from(*i).unwrap(),
            other => panic!("non-integer key {other:?}"),
        })
        .collect();
    let mut sorted = keys.clone();
    sorted.sort_unstable();
    assert_eq!(keys, sorted);
    assert!(root
        .iter()
        .any(|(k, v)| *k == Value::Integer(223u64.into()) && *v == Value::Text("4.250".into())));
}

#[test]
fn general_cbor_library_agrees_on_path_encoding() {
    let path = FieldPath::from([453, 1, 802, 0, 523]);
    let mut reference = Vec::new();
    ciborium::ser::into_writer(&vec![453u64, 1, 802, 0, 523], &mut reference).unwrap();
    assert_eq!(path.encode(), reference);
}

#[test]
fn session_fields_never_reach_the_tree() {
    let tree = bond_tree();
    for tag in [8, 9, 10, 34, 35, 49, 52, 56] {
        assert!(tree.root().get(tag).is_none(), "tag {tag} leaked");
    }
}

#[test]
fn nested_group_fields_are_addressable() {
    let tree = bond_tree();
    assert_eq!(
        tree.scalar(&FieldPath::from([453, 1, 802, 0, 523])),
        Some("AGENT")
    );
    assert_eq!(tree.scalar(&FieldPath::from([454, 1, 455])), Some("US91282CJL54"));
    assert_eq!(tree.scalar_count(), 19);
}

#[test]
fn encode_decode_round_trip_preserves_entry_order() {
    let tree = bond_tree();
    let bytes = encode(&tree).unwrap();
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, tree);
    assert_eq!(encode(&decoded).unwrap(), bytes);
}

#[test]
fn encoding_is_deterministic_across_calls() {
    let first = encode(&bond_tree()).unwrap();
    for _ in 0..10 {
        assert_eq!(encode(&bond_tree()).unwrap(), first);
    }
}

#[test]
fn top_level_field_order_in_input_does_not_change_bytes() {
    let a = "15=USD|223=4.250|541=20341115";
    let b = "541=20341115|15=USD|223=4.250";
    let schema = Schema::instrument();
    let options = ExtractOptions::default();
    let ta = canonicalize(a, &schema, &options).unwrap().0;
    let tb = canonicalize(b, &schema, &options).unwrap().0;
    assert_eq!(encode(&ta).unwrap(), encode(&tb).unwrap());
}

proptest! {
    #[test]
    fn raw_field_order_never_changes_encoding(
        seed in prop::collection::vec(any::<u32>(), 0..12),
        shuffle in any::<u64>(),
    ) {
        let schema = Schema::instrument();
        let mut fields: Vec<RawField> = Vec::new();
        for (i, s) in seed.iter().enumerate() {
            let tag = 1000 + (s % 400) + (i as u32) * 400;
            fields.push(RawField::top(tag, format!("v{s}")));
        }
        let party = GroupScope::root().enter(453, 0);
        fields.push(RawField::scoped(448, "P0", party.clone()));
        fields.push(RawField::scoped(452, "1", party));
        fields.push(RawField::scoped(448, "P1", GroupScope::root().enter(453, 1)));

        let baseline = encode(&build_tree(&fields, &schema).unwrap()).unwrap();

        let mut permuted = fields.clone();
        let len = permuted.len();
        let mut state = shuffle;
        for i in (1..len).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state >> 33) as usize % (i + 1);
            permuted.swap(i, j);
        }
        let shuffled = encode(&build_tree(&permuted, &schema).unwrap()).unwrap();
        prop_assert_eq!(baseline, shuffled);
    }

    #[test]
    fn decode_inverts_encode_for_flat_trees(
        values in prop::collection::btree_map(1u32..100_000, "[ -~]{1,24}", 0..16)
    ) {
        let fields: Vec<RawField> = values
            .iter()
            .map(|(tag, value)| RawField::top(*tag, value.clone()))
            .collect();
        let tree = build_tree(&fields, &Schema::flat()).unwrap();
        let bytes = encode(&tree).unwrap();
        prop_assert_eq!(decode(&bytes).unwrap(), tree);
    }
}

#[test]
fn extraction_report_serializes_for_tooling() {
    let extraction = extract(
        "15=USD|oops|223=4.250",
        &Schema::flat(),
        &ExtractOptions::default(),
    )
    .unwrap();
    let json = serde_json::to_value(&extraction.report).unwrap();
    assert_eq!(json["status"], "Lossy");
    assert_eq!(json["warnings"][0]["code"], "MissingEquals");
    assert_eq!(json["metrics"]["missing_equals"], 1);
}
