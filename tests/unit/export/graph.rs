use super::*;

#[test]
fn two_overlays_chain_into_vout() {
    let g = FilterGraph::new(2);
    assert_eq!(
        g.to_string(),
        "[0:v][1:v]overlay=0:0[v1];[v1][2:v]overlay=0:0[vout]"
    );
    assert_eq!(g.input_count(), 3);
    assert_eq!(g.link_count(), 2);
    assert_eq!(g.output_map(), "[vout]");
}

#[test]
fn single_overlay_goes_straight_to_vout() {
    assert_eq!(FilterGraph::new(1).to_string(), "[0:v][1:v]overlay=0:0[vout]");
}

#[test]
fn intermediate_labels_are_sequential() {
    let text = FilterGraph::new(4).to_string();
    let links: Vec<&str> = text.split(';').collect();
    assert_eq!(links.len(), 4);
    assert_eq!(links[1], "[v1][2:v]overlay=0:0[v2]");
    assert_eq!(links[2], "[v2][3:v]overlay=0:0[v3]");
    assert!(links[3].ends_with("[vout]"));
    assert_eq!(text.matches("[vout]").count(), 1);
}

#[test]
fn empty_graph_renders_nothing() {
    let g = FilterGraph::new(0);
    assert!(g.is_empty());
    assert_eq!(g.to_string(), "");
}
