use protein_window_features::alphabet::*;

#[test]
fn test_exchange_reduction_table() {
    assert_eq!(reduce_str("HRKDENQCSTPAGMILVFYW"), "UUUOOOOJZZZZZXXXXBBB");

    let reduced = reduce(AMINO_ACIDS);
    assert_eq!(reduced.len(), AMINO_ACIDS.len());
    assert!(reduced.iter().all(|b| EXCHANGE_GROUPS.contains(b)));
}
