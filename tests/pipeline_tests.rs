use std::collections::BTreeMap;
use std::sync::Arc;

use sidewalk_crowding::adapters::outbound::PlanarSurface;
use sidewalk_crowding::domains::crowding::*;
use sidewalk_crowding::DomainError;

fn measured(values: &[f64]) -> Vec<Option<CrowdingSample>> {
    values.iter().map(|v| Some(CrowdingSample::Measured(*v))).collect()
}

fn sidewalk_group(name: &str, pedestrians: f64) -> GroupInput {
    GroupInput {
        name: name.to_string(),
        pedestrian_count: pedestrians,
        segments: vec![
            Arc::new(PlanarSurface::rectangle(0.0, 0.0, 30.0, 6.0, 0.0)),
            Arc::new(PlanarSurface::rectangle(0.0, 6.0, 6.0, 30.0, 0.0)),
        ],
        attractors: vec![Point3::new(3.0, 3.0, 0.0)],
    }
}

fn params() -> AnalysisParams {
    AnalysisParams {
        desired_spacing: 6.0,
        grid_pitch: 3.0,
        iterations: 3,
        attractor_radius: 20.0,
        attractor_strength: 2.0,
        seed: 2024,
    }
}

#[cfg(test)]
mod iteration_aggregator_tests {
    use super::*;

    #[test]
    fn test_recency_weighted_blend_not_mean() {
        let mut aggregator = IterationAggregator::new(1);
        for v in [10.0, 6.0, 4.0] {
            aggregator.push(&measured(&[v])).unwrap();
        }
        assert_eq!(aggregator.passes(), 3);
        // ((10 + 6) / 2 + 4) / 2, while the mean would be 6.666...
        assert_eq!(aggregator.finish(), vec![Some(6.0)]);
    }

    #[test]
    fn test_blend_is_order_sensitive() {
        let blend = |order: &[f64]| {
            let mut aggregator = IterationAggregator::new(1);
            for v in order {
                aggregator.push(&measured(&[*v])).unwrap();
            }
            aggregator.finish()[0].unwrap()
        };
        assert_eq!(blend(&[10.0, 6.0, 4.0]), 6.0);
        assert_eq!(blend(&[4.0, 6.0, 10.0]), 7.5);
    }

    #[test]
    fn test_pass_keys_sort_segment_major() {
        let mut passes = BTreeMap::new();
        // inserted out of order on purpose
        passes.insert(PassKey::new(1, 0), measured(&[4.0]));
        passes.insert(PassKey::new(0, 1), measured(&[6.0]));
        passes.insert(PassKey::new(0, 0), measured(&[10.0]));

        assert_eq!(aggregate_passes(1, &passes).unwrap(), vec![Some(6.0)]);
    }

    #[test]
    fn test_no_data_samples_blend_by_value_and_missing_cells_stay_missing() {
        let mut aggregator = IterationAggregator::new(3);
        aggregator
            .push(&[Some(CrowdingSample::NoData(20.0)), None, Some(CrowdingSample::Measured(2.0))])
            .unwrap();
        aggregator
            .push(&[Some(CrowdingSample::Measured(4.0)), None, None])
            .unwrap();

        assert_eq!(aggregator.finish(), vec![Some(12.0), None, Some(2.0)]);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let mut aggregator = IterationAggregator::new(2);
        let err = aggregator.push(&measured(&[1.0])).unwrap_err();
        assert!(matches!(
            err,
            DomainError::PassLengthMismatch { expected: 2, actual: 1 }
        ));
    }
}

#[cfg(test)]
mod analysis_tests {
    use super::*;

    #[test]
    fn test_group_report_shapes() {
        let request = AnalysisRequest {
            groups: vec![sidewalk_group("block-a", 25.0)],
            params: params(),
        };
        let report = analyze(&request).unwrap();
        let group = &report.groups[0];

        // union box 30 x 30 at pitch 3
        assert_eq!((group.rows, group.columns), (10, 10));
        assert_eq!(group.metrics.len(), 100);
        assert_eq!(group.cells.len(), 100);
        assert_eq!(group.passes, 6);
        assert!(group.skipped_segments.is_empty());

        // L-shaped sidewalk: 10 cells along the bottom + 2 columns of 8 up the side
        let present = group.metrics.iter().flatten().count();
        assert_eq!(present, 10 * 2 + 2 * 8);
        assert_eq!(group.colored_grid.face_count(), present);
        assert_eq!(group.problem_area.face_count(), group.collision_count);
        assert_eq!(group.collision_indices.len(), group.collision_count);
        for &i in &group.collision_indices {
            assert!(group.metrics[i].unwrap() < 6.0);
        }
    }

    #[test]
    fn test_same_seed_same_report() {
        let request = AnalysisRequest {
            groups: vec![sidewalk_group("block-a", 25.0), sidewalk_group("block-b", 60.0)],
            params: params(),
        };
        let first = analyze(&request).unwrap();
        let second = analyze(&request).unwrap();

        assert_eq!(first.groups, second.groups);
        assert_ne!(first.groups[0].metrics, first.groups[1].metrics);
    }

    #[test]
    fn test_zero_pedestrians_reports_diagonal_sentinel() {
        let request = AnalysisRequest {
            groups: vec![GroupInput {
                name: "empty".to_string(),
                pedestrian_count: 0.0,
                segments: vec![Arc::new(PlanarSurface::rectangle(0.0, 0.0, 6.0, 8.0, 0.0))],
                attractors: Vec::new(),
            }],
            params: params(),
        };
        let report = analyze(&request).unwrap();
        let group = &report.groups[0];

        assert_eq!(group.metrics.len(), 6);
        assert!(group.metrics.iter().all(|m| *m == Some(10.0)));
        assert_eq!(group.collision_count, 0);
    }

    #[test]
    fn test_invalid_segment_is_skipped_not_fatal() {
        let mut group = sidewalk_group("block-a", 20.0);
        group
            .segments
            .insert(1, Arc::new(PlanarSurface::rectangle(50.0, 50.0, 50.0, 60.0, 0.0)));
        let request = AnalysisRequest {
            groups: vec![group],
            params: params(),
        };
        let report = analyze(&request).unwrap();
        let group = &report.groups[0];

        assert_eq!(group.skipped_segments, vec![1]);
        assert_eq!(group.passes, 6);
        // the degenerate segment does not widen the grid
        assert_eq!((group.rows, group.columns), (10, 10));
    }

    #[test]
    fn test_group_without_segments_is_empty() {
        let request = AnalysisRequest {
            groups: vec![GroupInput {
                name: "nothing".to_string(),
                pedestrian_count: 10.0,
                segments: Vec::new(),
                attractors: Vec::new(),
            }],
            params: params(),
        };
        let report = analyze(&request).unwrap();
        assert!(report.groups[0].metrics.is_empty());
        assert_eq!(report.total_collisions(), 0);
    }

    #[test]
    fn test_invalid_pitch_is_rejected() {
        let mut bad = params();
        bad.grid_pitch = 0.0;
        let request = AnalysisRequest {
            groups: vec![sidewalk_group("block-a", 10.0)],
            params: bad,
        };
        assert!(matches!(
            analyze(&request),
            Err(DomainError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_segments_only_measure_their_own_cells() {
        let near: Arc<dyn SurfaceDomain> = Arc::new(PlanarSurface::rectangle(0.0, 0.0, 6.0, 6.0, 0.0));
        let far: Arc<dyn SurfaceDomain> = Arc::new(PlanarSurface::rectangle(300.0, 0.0, 306.0, 6.0, 0.0));
        let single_params = AnalysisParams {
            iterations: 1,
            ..params()
        };
        let run = |segments: Vec<Arc<dyn SurfaceDomain>>| {
            let request = AnalysisRequest {
                groups: vec![GroupInput {
                    name: "split".to_string(),
                    pedestrian_count: 20.0,
                    segments,
                    attractors: Vec::new(),
                }],
                params: single_params.clone(),
            };
            analyze(&request).unwrap().groups.remove(0)
        };

        let both = run(vec![near.clone(), far]);
        let alone = run(vec![near]);

        assert_eq!((both.rows, both.columns), (2, 102));
        assert_eq!((alone.rows, alone.columns), (2, 2));
        for row in 0..2 {
            for column in 0..2 {
                let shared = both.metrics[row * 102 + column];
                let own = alone.metrics[row * 2 + column];
                assert!(own.is_some());
                assert_eq!(shared, own);
                assert_eq!(
                    both.cells[row * 102 + column].map(|c| c.collision),
                    alone.cells[row * 2 + column].map(|c| c.collision)
                );
            }
            // the gap between the two sidewalks has no cells
            assert!(both.metrics[row * 102 + 50].is_none());
            assert!(both.metrics[row * 102 + 101].is_some());
        }
    }

    #[test]
    fn test_oversized_lattice_is_rejected() {
        let huge: Arc<dyn SurfaceDomain> =
            Arc::new(PlanarSurface::rectangle(0.0, 0.0, 1e6, 1e6, 0.0));
        for pitch in [1e-3, 1e-9] {
            let request = AnalysisRequest {
                groups: vec![GroupInput {
                    name: "plaza".to_string(),
                    pedestrian_count: 10.0,
                    segments: vec![huge.clone()],
                    attractors: Vec::new(),
                }],
                params: AnalysisParams {
                    grid_pitch: pitch,
                    ..params()
                },
            };
            assert!(request.params.validate().is_ok());
            assert!(matches!(
                analyze(&request),
                Err(DomainError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_zero_iterations_is_rejected() {
        let mut bad = params();
        bad.iterations = 0;
        assert!(matches!(
            bad.validate(),
            Err(DomainError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_pass_seed_depends_on_every_coordinate() {
        let base = pass_seed(7, 0, 0, 0);
        assert_ne!(base, pass_seed(8, 0, 0, 0));
        assert_ne!(base, pass_seed(7, 1, 0, 0));
        assert_ne!(base, pass_seed(7, 0, 1, 0));
        assert_ne!(base, pass_seed(7, 0, 0, 1));
        assert_ne!(pass_seed(7, 1, 0, 0), pass_seed(7, 0, 1, 0));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let request = AnalysisRequest {
            groups: vec![sidewalk_group("block-a", 12.0)],
            params: params(),
        };
        let json = analyze(&request).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["groups"][0]["name"], "block-a");
        assert!(value["groups"][0]["colored_grid"]["faces"].is_array());
    }
}
