/// Merge tests
///
/// Algebra of `ReprojectingMerger` and reprojection of mixed inputs.
/// Run with: cargo test --test merge_tests

mod common;

use common::{mercator, wgs};
use dirtyregion::transform::{AffineTransform, CoordinateTransform, WebMercatorToGeographic};
use dirtyregion::{ReferenceSystem, RegionMerger, ReprojectingMerger, SpatialExtent, TransformRegistry};
use geo_types::coord;
use std::sync::Arc;

fn merge(extents: &[SpatialExtent]) -> SpatialExtent {
    ReprojectingMerger::default()
        .merge(&ReferenceSystem::wgs84(), extents)
        .unwrap()
        .unwrap()
}

#[test]
fn test_merge_is_order_independent() {
    let a = wgs(-10.0, -5.0, 0.0, 5.0);
    let b = wgs(3.0, 1.0, 4.0, 20.0);
    let c = wgs(-1.0, -30.0, 1.0, -29.0);

    let expected = wgs(-10.0, -30.0, 4.0, 20.0);
    assert_eq!(merge(&[a.clone(), b.clone(), c.clone()]), expected);
    assert_eq!(merge(&[c.clone(), a.clone(), b.clone()]), expected);
    assert_eq!(merge(&[b.clone(), c.clone(), a.clone()]), expected);

    // (a + b) + c == a + (b + c)
    let ab = merge(&[a.clone(), b.clone()]);
    let bc = merge(&[b, c.clone()]);
    assert_eq!(merge(&[ab, c]), merge(&[a, bc]));
}

#[test]
fn test_same_system_merge_is_plain_union() {
    let merger = ReprojectingMerger::default();
    let a = mercator(0.0, 0.0, 1000.0, 1000.0);
    let b = mercator(-500.0, 200.0, 10.0, 5000.0);

    let merged = merger
        .merge(&ReferenceSystem::web_mercator(), &[a.clone(), b.clone()])
        .unwrap()
        .unwrap();
    assert_eq!(merged, a.union(&b).unwrap());

    let single = merger
        .merge(&ReferenceSystem::web_mercator(), &[a.clone()])
        .unwrap()
        .unwrap();
    assert_eq!(single, a);
}

#[test]
fn test_hemispheres_merge_to_world() {
    let merged = merge(&[wgs(-180.0, 0.0, 0.0, 90.0), wgs(0.0, 0.0, 180.0, 90.0)]);
    assert_eq!(merged, wgs(-180.0, 0.0, 180.0, 90.0));
}

#[test]
fn test_compound_extent_merges_into_other_horizontal_system() {
    let compound = ReferenceSystem::compound("EPSG:3857+5709", "EPSG:3857", "EPSG:5709");
    let raised = SpatialExtent::new_3d(
        (142892.0, 470783.0, 16.0),
        (142900.0, 470790.0, 20.0),
        compound,
    )
    .unwrap();

    let merged = merge(&[raised]);

    let inverse = WebMercatorToGeographic;
    let lower = inverse.transform(coord! { x: 142892.0, y: 470783.0 }).unwrap();
    let upper = inverse.transform(coord! { x: 142900.0, y: 470790.0 }).unwrap();
    let expected = wgs(lower.x, lower.y, upper.x, upper.y);

    assert!(!merged.is_3d());
    assert_eq!(merged.reference_system(), &ReferenceSystem::wgs84());
    assert!(merged.approx_eq(&expected, 1e-9), "{} != {}", merged, expected);
}

#[test]
fn test_compound_target_uses_horizontal_component() {
    let target = ReferenceSystem::compound("EPSG:4326+5773", "EPSG:4326", "EPSG:5773");
    let merged = ReprojectingMerger::default()
        .merge(&target, &[wgs(1.0, 1.0, 2.0, 2.0)])
        .unwrap()
        .unwrap();
    assert_eq!(merged, wgs(1.0, 1.0, 2.0, 2.0));
}

#[test]
fn test_mixed_systems_merge() {
    let merged = merge(&[mercator(0.0, 0.0, 111319.49079327357, 0.0), wgs(-1.0, -1.0, 0.0, 0.0)]);
    assert!(merged.approx_eq(&wgs(-1.0, -1.0, 1.0, 0.0), 1e-9), "{}", merged);
}

#[test]
fn test_registered_transform_is_used() {
    // Shifted local grid, 1 unit = 1 degree, origin at (5, 50)
    let mut transforms = TransformRegistry::with_default_transforms();
    transforms.register("LOCAL:GRID", "EPSG:4326", Arc::new(AffineTransform::translation(5.0, 50.0)));
    let merger = ReprojectingMerger::new(Arc::new(transforms));

    let local = SpatialExtent::new(0.0, 0.0, 2.0, 1.0, ReferenceSystem::horizontal("LOCAL:GRID")).unwrap();
    let merged = merger
        .merge(&ReferenceSystem::wgs84(), &[local, wgs(4.0, 49.0, 5.5, 50.5)])
        .unwrap()
        .unwrap();
    assert_eq!(merged, wgs(4.0, 49.0, 7.0, 51.0));
}
