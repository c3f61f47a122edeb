use super::*;

#[test]
fn split_triangle_is_red_over_blue() {
    let upper = BASELINE_PIXELS
        .iter()
        .find(|p| p.coord == Coord::normalized(0.3, 0.4))
        .unwrap();
    let lower = BASELINE_PIXELS
        .iter()
        .find(|p| p.coord == Coord::normalized(0.3, 0.6))
        .unwrap();
    assert_eq!(upper.color, RED);
    assert_eq!(lower.color, BLUE);
}

#[test]
fn baseline_checks_are_exact() {
    assert_eq!(BASELINE_PIXELS[0].coord, Coord::normalized(0.1, 0.1));
    assert_eq!(BASELINE_PIXELS[0].color, BACKGROUND);
    assert!(BASELINE_PIXELS.iter().all(|p| p.tolerance == 0.0));
}

#[test]
fn channel_checks_use_distinct_references() {
    assert_eq!(DEPTH.channel, 0);
    assert_eq!(STENCIL.channel, 1);
    assert_ne!(DEPTH.image_file_name(), STENCIL.image_file_name());
    assert_eq!(DEPTH.image_file_name(), "depth.png");
    assert_eq!(combined_image_name(), "ClearBeforeDraw.Depth.png");
}
