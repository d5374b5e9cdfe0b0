use presize::cluster::{Clustering, Kmeans};
use presize::{adjust_scores, convert_height, SizeLabel, SizeScores};
use proptest::prelude::*;

fn size_label() -> impl Strategy<Value = SizeLabel> {
    prop::sample::select(SizeLabel::ALL.to_vec())
}

fn scores() -> impl Strategy<Value = SizeScores> {
    prop::array::uniform4(0.01f64..1.0).prop_map(|[s, m, l, xl]| {
        let mut scores = SizeScores { s, m, l, xl };
        scores.normalize();
        scores
    })
}

proptest! {
    #[test]
    fn prop_kmeans_all_assigned(
        data in prop::collection::vec(prop::collection::vec(-10.0f32..10.0, 5), 1..30),
        k in 1usize..12
    ) {
        if k <= data.len() {
            let model = Kmeans::new(k).with_seed(42);
            let labels = model.fit_predict(&data).unwrap();

            prop_assert_eq!(labels.len(), data.len());
            for &l in &labels {
                prop_assert!(l < k);
            }
        }
    }

    #[test]
    fn prop_kmeans_seeded_runs_agree(
        data in prop::collection::vec(prop::collection::vec(0.0f32..200.0, 5), 12..40),
    ) {
        let a = Kmeans::new(11).with_seed(42).fit(&data).unwrap();
        let b = Kmeans::new(11).with_seed(42).fit(&data).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_adjust_keeps_distribution(
        start in scores(),
        steps in prop::collection::vec((size_label(), size_label(), 0.0f64..=1.0), 1..50),
    ) {
        let mut scores = start;
        for (from, to, rate) in steps {
            adjust_scores(&mut scores, from, to, rate);
            prop_assert!((scores.total() - 1.0).abs() < 1e-9);
            for label in SizeLabel::ALL {
                let v = scores.get(label);
                prop_assert!((0.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn prop_adjust_raises_target(
        start in scores(),
        from in size_label(),
        to in size_label(),
        rate in 0.001f64..=1.0,
    ) {
        prop_assume!(from != to);
        prop_assume!(start.get(to) < 1.0 - 1e-9);
        let mut scores = start;
        adjust_scores(&mut scores, from, to, rate);
        prop_assert!(scores.get(to) > start.get(to));
    }

    #[test]
    fn prop_adjust_same_size_is_noop(start in scores(), label in size_label(), rate in 0.0f64..=1.0) {
        let mut scores = start;
        adjust_scores(&mut scores, label, label, rate);
        for l in SizeLabel::ALL {
            prop_assert!((scores.get(l) - start.get(l)).abs() < 1e-12);
        }
    }

    #[test]
    fn prop_height_conversion(feet in 0i64..9, inches in 0i64..12) {
        let cm = convert_height(&format!("{feet}'{inches}")).unwrap();
        let expected = feet as f64 * 30.48 + inches as f64 * 2.54;
        prop_assert!((cm - expected).abs() <= 0.005 + 1e-9);
    }
}
