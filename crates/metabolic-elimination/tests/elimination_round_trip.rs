use metabolic_elimination::dataset::{Dataset, FeatureRecord};
use metabolic_elimination::elimination::eliminate_best_k;
use metabolic_elimination::feature_selection::{select_not_k_best, ScoreCriterion, SelectNotKBest};
use metabolic_elimination::vectorizer::{DictVectorizer, InverseDictVectorizer};
use metabolic_elimination::EliminationError;
use ndarray::{array, Array1, Array2};

fn record(pairs: &[(&str, f64)]) -> FeatureRecord {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn fixed_scores(scores: Vec<f64>) -> impl Fn(&Array2<f64>, &[usize]) -> Array1<f64> + Clone {
    move |_: &Array2<f64>, _: &[usize]| Array1::from(scores.clone())
}

#[test]
fn ties_keep_the_lower_index_among_the_best() {
    let x = Array2::<f64>::zeros((2, 4));
    let y = [0, 1];
    let score = fixed_scores(vec![2.0, 1.0, 2.0, 1.0]);

    assert_eq!(select_not_k_best(&x, &y, 1, &score).unwrap(), vec![1, 2, 3]);
    assert_eq!(select_not_k_best(&x, &y, 3, &score).unwrap(), vec![3]);
    assert_eq!(select_not_k_best(&x, &y, 0, &score).unwrap(), vec![0, 1, 2, 3]);
    assert!(select_not_k_best(&x, &y, 9, &score).unwrap().is_empty());
    assert!(matches!(
        select_not_k_best(&x, &y, -1, &score),
        Err(EliminationError::InvalidParameter(_))
    ));
}

#[test]
fn retained_plus_eliminated_covers_the_vocabulary() {
    let records = vec![
        record(&[("a", 1.0), ("b", 0.3), ("c", 5.0)]),
        record(&[("a", 1.2), ("b", 0.1)]),
        record(&[("a", -1.0), ("b", 0.2), ("c", 4.0)]),
        record(&[("a", -1.1), ("b", 0.4), ("d", 1.0)]),
    ];
    let y = vec![0, 0, 1, 1];

    let mut vect = DictVectorizer::new();
    let x = vect.fit_transform(&records);
    assert_eq!(vect.vocabulary(), &["a", "b", "c", "d"]);

    for k in 0..=5i64 {
        let mut selector = SelectNotKBest::new(k).unwrap();
        let selected = selector.fit_transform(&x, &y).unwrap();
        let eliminated = (k as usize).min(vect.vocabulary().len());
        assert_eq!(selector.support().len() + eliminated, vect.vocabulary().len());

        let back = InverseDictVectorizer::new(&vect, &selector).transform(&selected).unwrap();
        assert_eq!(back.len(), records.len());
        for record in &back {
            assert!(record.keys().all(|name| selector
                .support()
                .iter()
                .any(|&i| vect.vocabulary()[i] == *name)));
        }
    }
}

#[test]
fn zero_elimination_round_trips_present_values() {
    let records = vec![
        record(&[("R1", 1.5), ("R2", 0.0)]),
        record(&[("R1", -0.5), ("R3", 2.0)]),
        record(&[("R2", 3.0)]),
    ];
    let labels = vec!["bc".to_string(), "h".to_string(), "h".to_string()];
    let dataset = Dataset::new(records.clone(), labels).unwrap();

    let reduced = eliminate_best_k(&dataset, 0, ScoreCriterion::FClassif).unwrap();
    for (before, after) in records.iter().zip(reduced.records()) {
        for (name, value) in before {
            assert_eq!(after.get(name), Some(value));
        }
    }
}

#[test]
fn strongest_feature_is_the_first_removed() {
    let records = vec![
        record(&[("signal", 3.0), ("noise", 0.2)]),
        record(&[("signal", 3.1), ("noise", 0.9)]),
        record(&[("signal", -3.0), ("noise", 0.4)]),
        record(&[("signal", -2.9), ("noise", 0.5)]),
    ];
    let labels = ["bc", "bc", "h", "h"].iter().map(|s| s.to_string()).collect();
    let dataset = Dataset::new(records, labels).unwrap();

    let reduced = eliminate_best_k(&dataset, 1, ScoreCriterion::FClassif).unwrap();
    assert!(reduced.records().iter().all(|r| !r.contains_key("signal")));
    assert!(reduced.records().iter().all(|r| r.contains_key("noise")));
    assert_eq!(reduced.labels(), dataset.labels());

    let x = array![[3.0, 0.2], [3.1, 0.9], [-3.0, 0.4], [-2.9, 0.5]];
    let kept = select_not_k_best(&x, &[0, 0, 1, 1], 1, ScoreCriterion::FClassif).unwrap();
    assert_eq!(kept, vec![1]);
}
