//! Structural properties of segmentation over pseudo-random terrain.
//!
//! Grids come from a fixed-seed generator so failures are reproducible.

use spillway_algorithms::hydrology::{segment, BasinPartition, SegmentationParams};
use spillway_core::HeightField;

/// Small deterministic generator (PCG-style LCG step, high bits out)
struct Terrain(u64);

impl Terrain {
    fn next(&mut self, range: u32) -> u32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) % u64::from(range)) as u32
    }

    fn field(&mut self, width: usize, height: usize, range: u32) -> HeightField {
        let data = (0..width * height).map(|_| self.next(range)).collect();
        HeightField::new(data, width, height).unwrap()
    }
}

/// Sizes and value ranges swept by every property
fn cases() -> Vec<HeightField> {
    let mut terrain = Terrain(0x5eed);
    let mut fields = Vec::new();
    for &(w, h) in &[(1, 1), (1, 9), (9, 1), (4, 4), (7, 5), (12, 12), (25, 17)] {
        for &range in &[1, 2, 4, 16, 200] {
            for _ in 0..3 {
                fields.push(terrain.field(w, h, range));
            }
        }
    }
    fields
}

fn check_partition(field: &HeightField, partition: &BasinPartition) {
    let count = partition.basin_count();
    assert!(count >= 1, "every non-empty field has a basin");

    let mut seen = vec![false; count];
    let mut minima = vec![0_usize; count];
    for (index, vertex) in partition.vertices().iter().enumerate() {
        assert!(!vertex.basin_ids.is_empty(), "cell {} has no basin", index);
        assert_eq!(vertex.z, field.z_at(index));
        for id in vertex.basin_ids.iter() {
            assert!((id as usize) < count, "id {} out of range", id);
            seen[id as usize] = true;
        }
        if let Some(id) = vertex.basin_id {
            assert_eq!(vertex.basin_ids.sole(), Some(id), "minimum cell must be interior");
            minima[id as usize] += 1;
        }
    }
    assert!(seen.iter().all(|&s| s), "ids must be dense");
    assert!(minima.iter().all(|&m| m == 1), "one minimum per basin");

    // The minimum is the lowest cell carrying its id
    for id in 0..count as u32 {
        let ground = partition.vertices()[partition.minimum_of(id).unwrap()].z;
        for vertex in partition.vertices() {
            if vertex.basin_ids.contains(id) {
                assert!(vertex.z >= ground, "basin {} has a cell below its minimum", id);
            }
        }
    }

    // Ids ascend with minimum elevation
    let grounds: Vec<u32> = partition
        .minima()
        .unwrap()
        .into_iter()
        .map(|m| partition.vertices()[m].z)
        .collect();
    assert!(grounds.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn partitions_are_well_formed() {
    for field in cases() {
        for max_z_diff in [0, 1, 3, 50] {
            let partition = segment(&field, SegmentationParams { max_z_diff }).unwrap();
            check_partition(&field, &partition);
        }
    }
}

#[test]
fn normalization_is_idempotent() {
    for field in cases() {
        let partition = segment(&field, SegmentationParams::default()).unwrap();
        let mut again = partition.clone();
        again.normalize().unwrap();
        assert_eq!(partition, again);
    }
}

#[test]
fn larger_tolerance_never_adds_basins() {
    for field in cases() {
        let counts: Vec<usize> = [0, 1, 2, 5, 20, 1000]
            .iter()
            .map(|&max_z_diff| {
                segment(&field, SegmentationParams { max_z_diff })
                    .unwrap()
                    .basin_count()
            })
            .collect();
        assert!(
            counts.windows(2).all(|w| w[1] <= w[0]),
            "basin counts must not grow: {:?}",
            counts
        );
    }
}

#[test]
fn flat_field_is_one_basin() {
    let field = HeightField::new(vec![7; 30], 6, 5).unwrap();
    let partition = segment(&field, SegmentationParams::default()).unwrap();
    assert_eq!(partition.basin_count(), 1);
    assert_eq!(partition.minimum_of(0).unwrap(), 0);
}

#[test]
fn segmentation_is_deterministic() {
    let mut terrain = Terrain(42);
    let field = terrain.field(20, 20, 30);
    let a = segment(&field, SegmentationParams { max_z_diff: 2 }).unwrap();
    let b = segment(&field, SegmentationParams { max_z_diff: 2 }).unwrap();
    assert_eq!(a, b);
}
