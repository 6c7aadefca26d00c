mod support;

use bingrid::{
    GridError, GridSize,
    float_types::{OVERLAP, Real},
    grid::{
        self, GridSpec, PieceCounts, Subpart, decompose, extract_cell, merge, plan, reassemble,
    },
    mesh::bsp::BspEngine,
};
use nalgebra::Point3;

use crate::support::{
    Pieces, Styled, approx_eq, assert_spans, block, bounding_box, hollow_bin, styled_bin,
};

#[test]
fn extraction_size_follows_grid() {
    let engine = BspEngine::new();
    let solid = block(120.0, 90.0, 25.0);
    for (n, m) in [(2, 2), (3, 2), (4, 3), (6, 5)] {
        let cell = extract_cell(&solid, GridSize::new(n, m), &engine).unwrap();
        assert!(approx_eq(cell.size_x, 120.0 / n as Real, 1e-9));
        assert!(approx_eq(cell.size_y, 90.0 / m as Real, 1e-9));
        assert!(approx_eq(cell.size_z, 25.0, 1e-9));

        // The cut reaches the margin past the seams but not past the outer walls.
        assert_spans(
            &cell.mesh,
            [cell.size_x + OVERLAP, cell.size_y + OVERLAP, 25.0],
            1e-6,
        );
    }
}

#[test]
fn extraction_rejects_single_row_input() {
    let solid = block(40.0, 120.0, 10.0);
    let result = extract_cell(&solid, GridSize::new(1, 3), &BspEngine::new());
    assert!(matches!(
        result,
        Err(GridError::InvalidGridSize { x: 1, y: 3, .. })
    ));
}

#[test]
fn decomposition_yields_twelve_normalised_parts() {
    let engine = BspEngine::new();
    let cell = extract_cell(&block(84.0, 84.0, 20.0), GridSize::new(2, 2), &engine).unwrap();
    let parts = decompose(&cell, 4.0, &engine).unwrap();

    assert_eq!(parts.iter().count(), 12);
    for (part, mesh) in parts.iter() {
        mesh.validate(part.name()).unwrap();
        let bb = bounding_box(mesh);
        assert!(
            bb[..3].iter().all(|c| c.abs() < 1e-9),
            "{} not at origin",
            part.name()
        );
    }

    let r = 4.0;
    let corner = parts.get(Subpart::BottomOuterCorner);
    assert_spans(corner, [r + OVERLAP, r + OVERLAP, r + OVERLAP], 1e-6);

    let floor = parts.get(Subpart::FloorPanel);
    let mid = 42.0 - 2.0 * r + 2.0 * OVERLAP;
    assert_spans(floor, [mid, mid, r + OVERLAP], 1e-6);

    // Seam regions run from the cut to the far side of the extracted cell.
    let junction = parts.get(Subpart::BottomCenterCorner);
    let seam = r + 2.0 * OVERLAP;
    assert_spans(junction, [seam, seam, r + OVERLAP], 1e-6);

    let wall = parts.get(Subpart::SideWallPanel);
    assert_spans(wall, [mid, r + OVERLAP, 20.0 - 2.0 * r + 2.0 * OVERLAP], 1e-6);
}

#[test]
fn decomposition_rejects_non_positive_radius() {
    let engine = BspEngine::new();
    let cell = extract_cell(&block(84.0, 84.0, 20.0), GridSize::new(2, 2), &engine).unwrap();
    assert!(matches!(
        decompose(&cell, 0.0, &engine),
        Err(GridError::InvalidParameter { name: "corner_radius", .. })
    ));
}

#[test]
fn single_cell_reassembly_matches_the_cell() {
    let engine = BspEngine::new();
    let cell = extract_cell(&block(84.0, 84.0, 20.0), GridSize::new(2, 2), &engine).unwrap();
    let parts = decompose(&cell, 4.0, &engine).unwrap();
    let spec = GridSpec::new(GridSize::new(1, 1), &cell, 20.0, 4.0);

    let pieces = reassemble(&parts, &spec).unwrap();
    assert_eq!(pieces.len(), PieceCounts::for_grid(GridSize::new(1, 1)).total());

    let merged = merge(pieces, false, &engine, 1e-5).unwrap();
    assert_spans(&merged, [42.0, 42.0, 20.0], 1e-6);
}

#[test]
fn union_merge_keeps_the_outline() {
    let engine = BspEngine::new();
    let cell = extract_cell(&block(60.0, 60.0, 12.0), GridSize::new(2, 2), &engine).unwrap();
    let parts = decompose(&cell, 3.0, &engine).unwrap();
    let spec = GridSpec::new(GridSize::new(1, 1), &cell, 12.0, 3.0);

    let pieces = reassemble(&parts, &spec).unwrap();
    let fused = merge(pieces, true, &engine, 1e-5).unwrap();
    assert_spans(&fused, [30.0, 30.0, 12.0], 1e-6);
}

#[test]
fn reassembly_scales_to_target_grid() {
    let engine = BspEngine::new();
    let cell = extract_cell(&hollow_bin(84.0, 84.0, 30.0, 2.0, 2.0), GridSize::new(2, 2), &engine)
        .unwrap();
    let parts = decompose(&cell, 4.0, &engine).unwrap();
    let spec = GridSpec::new(GridSize::new(3, 2), &cell, 40.0, 4.0);

    let pieces = reassemble(&parts, &spec).unwrap();
    assert_eq!(
        PieceCounts::of_plan(&plan(&spec)).total(),
        pieces.len()
    );

    let merged = merge(pieces, false, &engine, 1e-5).unwrap();
    assert_spans(&merged, [126.0, 84.0, 40.0], 1e-6);
}

#[test]
fn zero_sized_grid_is_an_empty_assembly() {
    let engine = BspEngine::new();
    let cell = extract_cell(&block(84.0, 84.0, 20.0), GridSize::new(2, 2), &engine).unwrap();
    let parts = decompose(&cell, 4.0, &engine).unwrap();
    let spec = GridSpec::new(GridSize::new(0, 2), &cell, 20.0, 4.0);

    assert!(matches!(
        grid::reassemble(&parts, &spec),
        Err(GridError::EmptyAssembly(_))
    ));
    assert!(matches!(
        merge(Vec::new(), false, &engine, 1e-5),
        Err(GridError::EmptyAssembly(_))
    ));
}

#[test]
fn oversized_radius_is_rejected_before_placement() {
    let engine = BspEngine::new();
    let cell = extract_cell(&block(84.0, 84.0, 20.0), GridSize::new(2, 2), &engine).unwrap();
    let parts = decompose(&cell, 4.0, &engine).unwrap();
    let spec = GridSpec::new(GridSize::new(2, 2), &cell, 6.0, 4.0);

    assert!(matches!(
        reassemble(&parts, &spec),
        Err(GridError::InvalidParameter { name: "height", .. })
    ));
}

/// Lattice points of `layout` that keep clear of its faces and region cuts.
fn clear_samples(layout: &Styled, r: Real) -> Vec<Point3<Real>> {
    let size = layout.size();
    let steps = |len: Real| (0..).map(|i| 0.23 + 1.7 * i as Real).take_while(move |v| *v < len);
    let mut points = Vec::new();
    for z in [0.37, 1.53, 6.71, size.z - 2.29] {
        for x in steps(size.x) {
            for y in steps(size.y) {
                let p = Point3::new(x, y, z);
                if layout.is_clear(&p, r, 0.05) {
                    points.push(p);
                }
            }
        }
    }
    points
}

fn assert_same_solid(solid: &Pieces, layout: &Styled, r: Real) {
    let points = clear_samples(layout, r);
    assert!(points.len() > 1000, "only {} samples", points.len());
    let wrong: Vec<_> = points
        .iter()
        .filter(|p| solid.contains(p) != layout.contains(p))
        .collect();
    assert!(
        wrong.is_empty(),
        "{} of {} samples misplaced, e.g. {:?}",
        wrong.len(),
        points.len(),
        wrong.first()
    );
}

#[test]
fn styled_fixture_matches_its_layout() {
    let layout = Styled::new((2, 2), 42.0, 20.0);
    let solid = Pieces::new([styled_bin(layout)]);
    assert_same_solid(&solid, &layout, 4.0);
}

#[test]
fn styled_cell_keeps_chamfers_and_recess() {
    let engine = BspEngine::new();
    let input = styled_bin(Styled::new((2, 2), 42.0, 20.0));
    let cell = extract_cell(&input, GridSize::new(2, 2), &engine).unwrap();
    let parts = decompose(&cell, 4.0, &engine).unwrap();
    let spec = GridSpec::new(GridSize::new(1, 1), &cell, 20.0, 4.0);

    let pieces = Pieces::new(reassemble(&parts, &spec).unwrap());
    assert_same_solid(&pieces, &Styled::new((1, 1), 42.0, 20.0), 4.0);
}

#[test]
fn styled_regions_land_in_a_taller_three_by_two_grid() {
    let engine = BspEngine::new();
    let input = styled_bin(Styled::new((2, 2), 42.0, 20.0));
    let cell = extract_cell(&input, GridSize::new(2, 2), &engine).unwrap();
    let parts = decompose(&cell, 4.0, &engine).unwrap();
    let spec = GridSpec::new(GridSize::new(3, 2), &cell, 30.0, 4.0);

    let pieces = Pieces::new(reassemble(&parts, &spec).unwrap());
    assert_same_solid(&pieces, &Styled::new((3, 2), 42.0, 30.0), 4.0);
}
