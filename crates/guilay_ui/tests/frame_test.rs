//! Integration tests for the place → rasterize → batch pipeline and the
//! spatial index built from the same placements.

use guilay_core::{Color, Extent, Point, Rect};
use guilay_ui::text::FONT_CHAR_WIDTH;
use guilay_ui::{
    rasterize, BitmapFont, Element, ElementTree, FlowLayout, FrameBuilder, NodeStatus, ParentRef,
    Quadtree, SpatialError, Text,
};

#[allow(clippy::cast_precision_loss)]
const STEP: f32 = FONT_CHAR_WIDTH as f32 + 0.5;

fn scene() -> ElementTree {
    let mut tree = ElementTree::new();
    tree.add_element(ParentRef::Root, Element::text("Hello", 2.0, Color::WHITE))
        .unwrap();
    let panel = tree
        .add_element(
            ParentRef::Root,
            Element::section(Rect::new(100.0, 100.0, 300.0, 200.0), Color::rgb(40, 40, 48)),
        )
        .unwrap();
    tree.add_element(
        ParentRef::Section(panel),
        Element::button(
            Rect::new(150.0, 150.0, 120.0, 40.0),
            Color::rgb(200, 60, 60),
            Text::new("Press", 1.0, Color::WHITE),
        ),
    )
    .unwrap();
    tree
}

#[test]
fn test_ab_advance_and_vertical_order() {
    let mut run = rasterize("AB", Point::ZERO, 1.0, Color::WHITE, &BitmapFont);
    let triangles: Vec<_> = run.by_ref().collect();

    assert!((run.pen().x - 2.0 * STEP).abs() < f32::EPSILON);

    // Within each glyph, quads come top row first
    let a_quads: Vec<_> = triangles
        .chunks(2)
        .take_while(|quad| quad[0].vertices[0].position[0] < STEP)
        .map(|quad| quad[0].vertices[0].position[1])
        .collect();
    assert!(a_quads.windows(2).all(|pair| pair[1] <= pair[0]));
    assert_eq!(a_quads.first().copied(), Some(6.0));
}

#[test]
fn test_frame_geometry_for_scene() {
    let tree = scene();
    let placements = FlowLayout::default().place(&tree, Extent::new(800, 600), &BitmapFont);
    assert_eq!(placements.len(), 3);

    let mut builder = FrameBuilder::new();
    builder.begin_frame();
    builder.push_placements(&tree, &placements, &BitmapFont);

    // Everything is solid fill with the bitmap font
    let batches = builder.end_frame();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].texture.is_none());
    // Section and button backgrounds contribute two triangles each
    assert!(builder.triangle_count() > 4);
    assert_eq!(batches[0].vertices.len() % 3, 0);
}

#[test]
fn test_index_from_placements() {
    let tree = scene();
    let placements = FlowLayout::default().place(&tree, Extent::new(800, 600), &BitmapFont);

    let mut index = Quadtree::new(Rect::new(0.0, 0.0, 800.0, 600.0), 8);
    for placement in &placements {
        index.insert(placement.id, placement.rect).unwrap();
    }

    let button = placements[2].id;
    let panel = placements[1].id;
    assert_eq!(index.hit_test(Point::new(160.0, 160.0)), Some(button));
    assert_eq!(index.hit_test(Point::new(380.0, 280.0)), Some(panel));
    assert_eq!(index.hit_test(Point::new(700.0, 50.0)), None);
    assert_eq!(index.root().status(), NodeStatus::PartiallyOccupied);
}

#[test]
fn test_reserved_region_rejects_insert_unchanged() {
    let tree = scene();
    let first = tree.child_at(ParentRef::Root, 0).unwrap();

    let mut index = Quadtree::new(Rect::new(0.0, 0.0, 800.0, 600.0), 8);
    index.reserve(Rect::new(0.0, 0.0, 800.0, 600.0)).unwrap();

    let err = index.insert(first, Rect::new(10.0, 10.0, 10.0, 10.0)).unwrap_err();
    assert!(matches!(err, SpatialError::CapacityExceeded { .. }));
    assert_eq!(index.root().status(), NodeStatus::FullyOccupied);
    assert!(index.is_empty());
}
