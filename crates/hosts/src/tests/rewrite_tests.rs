use super::*;

fn lines(text: &str) -> Vec<String> {
    text.split('\n').map(str::to_string).collect()
}

const SAMPLE: &str = "127.0.0.1 localhost
#MANAGED
10.20.3.15 api.dev.internal #SWAP
#10.20.4.15 web.dev.internal #SWAP
10.99.0.1 legacy.internal
#10.1.1.1 api.dev.internal #FAV[DEV51]
#10.1.2.2 api.dev.internal #FAV[staging]
#/MANAGED
192.168.0.10 printer";

#[test]
fn swap_rewrites_third_octet_and_enables_swap_entries() {
    let mut hosts = lines(SAMPLE);
    let changed = apply_swap(&mut hosts, 42);

    assert_eq!(hosts[2], "10.20.42.15 api.dev.internal #SWAP");
    assert_eq!(hosts[3], "10.20.42.15 web.dev.internal #SWAP");
    assert_eq!(hosts[4], "#10.99.0.1 legacy.internal");
    assert_eq!(hosts[5], "#10.1.1.1 api.dev.internal #FAV[DEV51]");
    assert_eq!(changed, 3);
}

#[test]
fn swap_leaves_lines_outside_managed_region_alone() {
    let mut hosts = lines(SAMPLE);
    apply_swap(&mut hosts, 9);

    assert_eq!(hosts[0], "127.0.0.1 localhost");
    assert_eq!(hosts[1], "#MANAGED");
    assert_eq!(hosts[7], "#/MANAGED");
    assert_eq!(hosts[8], "192.168.0.10 printer");
}

#[test]
fn swap_entry_without_address_is_only_uncommented() {
    let mut hosts = lines("#MANAGED\n#not-an-ip api #SWAP\n#/MANAGED");
    apply_swap(&mut hosts, 3);
    assert_eq!(hosts[1], "not-an-ip api #SWAP");
}

#[test]
fn favorite_enables_matching_entries_and_disables_the_rest() {
    let mut hosts = lines(SAMPLE);
    apply_favorite(&mut hosts, "staging");

    assert_eq!(hosts[2], "#10.20.3.15 api.dev.internal #SWAP");
    assert_eq!(hosts[3], "#10.20.4.15 web.dev.internal #SWAP");
    assert_eq!(hosts[5], "#10.1.1.1 api.dev.internal #FAV[DEV51]");
    assert_eq!(hosts[6], "10.1.2.2 api.dev.internal #FAV[staging]");
}

#[test]
fn switching_favorites_disables_the_previous_one() {
    let mut hosts = lines(SAMPLE);
    apply_favorite(&mut hosts, "staging");
    apply_favorite(&mut hosts, "DEV51");

    assert_eq!(hosts[5], "10.1.1.1 api.dev.internal #FAV[DEV51]");
    assert_eq!(hosts[6], "#10.1.2.2 api.dev.internal #FAV[staging]");
}

#[test]
fn unknown_favorite_disables_everything_in_region() {
    let mut hosts = lines(SAMPLE);
    apply_favorite(&mut hosts, "nope");
    assert!(hosts[2..7].iter().all(|line| line.starts_with('#')));
}

#[test]
fn managed_favorite_lookup_matches_whole_tags_inside_region() {
    let hosts = lines(SAMPLE);
    assert!(has_managed_favorite(&hosts, "DEV51"));
    assert!(has_managed_favorite(&hosts, "staging"));
    assert!(!has_managed_favorite(&hosts, "DEV5"));
    assert!(!has_managed_favorite(&hosts, "typo"));

    let outside = lines("10.0.0.9 stray #FAV[outside]
#MANAGED
#/MANAGED");
    assert!(!has_managed_favorite(&outside, "outside"));
}

#[test]
fn collects_favorites_in_file_order_without_duplicates() {
    let hosts = lines(
        "#10.0.0.1 a #FAV[box-b]\n10.0.0.2 b #FAV[box-a]\n#10.0.0.3 c #FAV[box-b]\nplain line",
    );
    let favorites = collect_favorites(&hosts);
    assert_eq!(
        favorites,
        vec![FavoriteSelector::from("box-b"), FavoriteSelector::from("box-a")]
    );
}
