use pede_analysis::{
    association::{Association, MeanComparison},
    cutoff::{Classifier, Criterion, RateTable, Rule},
    dataset::{Dataset, LoadError},
    distribution::{Denominator, FrequencyTable},
    grouping::GroupKey,
    overview::column_overview,
    profile::{IndicatorProfile, ProfileColumns, rate_by},
};

const CSV: &str = "\
Nome,IAN,IDA,IEG,IPV,Defas,Ano ingresso,Idade 22,Fase,Pedra 22
A1,5,6.3,8.0,7.1,0,2019,11,1,Ametista
A2,10,8.1,9.5,8.3,0,2018,12,2,Topázio
A3,2.5,3.2,4.1,5.9,-2,2021,13,2,Quartzo
A4,5,5.0,6.6,6.8,-1,2020,11,1,Ágata
A5,5,4.4,5.2,6.1,-1,2021,14,3,Quartzo
A6,10,9.0,9.1,8.8,0,2017,15,3,Topázio
A7,,7.7,8.4,7.5,,2019,12,2,Ametista
A8,2.5,2.9,n/a,5.0,-3,2022,16,4,Quartzo
A9,2.5,6.8,7.2,7.4,-1,2020,13,ALFA,Ágata
A10,10,8.4,9.9,8.9,0,2018,14,4,Topázio
";

const COLUMNS: ProfileColumns<'static> = ProfileColumns {
    cohort: "Ano ingresso",
    age: "Idade 22",
    phase: "Fase",
    tier: "Pedra 22",
};

fn dataset() -> Dataset {
    Dataset::from_csv_reader(CSV.as_bytes())
        .unwrap()
        .coerce_numeric(&["IAN", "IDA", "IEG", "IPV", "Defas", "Fase"])
}

#[test]
fn adequacy_profile() {
    let dataset = dataset();
    let profile = IndicatorProfile::build(&dataset, "IAN", &COLUMNS, 12).unwrap();
    assert_eq!(profile.summary.total, 10);
    assert_eq!(profile.summary.present, 9);
    assert_eq!(profile.summary.missing, 1);

    let ian = dataset.numeric("IAN").unwrap();
    let freq = FrequencyTable::by_value(ian, Denominator::TotalRows);
    let rows = freq
        .rows
        .iter()
        .map(|r| (r.label.as_str(), r.count, r.percent))
        .collect::<Vec<_>>();
    assert_eq!(rows, vec![("2.5", 3, 30.0), ("5", 3, 30.0), ("10", 3, 30.0)]);

    // Tiers progress by mean, not alphabetically
    let tiers = profile
        .by_tier
        .rows
        .iter()
        .map(|r| r.key.to_string())
        .collect::<Vec<_>>();
    assert_eq!(tiers, vec!["Quartzo", "Ágata", "Ametista", "Topázio"]);

    // "ALFA" is not a phase number, so that row belongs to no phase group
    let phase_rows = profile.by_phase.rows.iter().map(|r| r.count).sum::<usize>();
    assert_eq!(phase_rows, 8);
}

#[test]
fn deficit_rates() {
    let dataset = dataset();
    let defas = dataset.numeric("Defas").unwrap();
    let table = RateTable::compute(
        defas,
        &[
            Criterion::new("none", Rule::equal_fixed(0.0)),
            Criterion::new("mild", Rule::equal_fixed(-1.0)),
            Criterion::new("moderate", Rule::at_most_fixed(-2.0)),
            Criterion::new("severe", Rule::at_most_fixed(-3.0)),
        ],
    );
    assert!(table.rows.iter().all(|r| r.present == 9));
    assert_eq!(table.get("moderate").unwrap().count, 2);
    assert_eq!(table.get("severe").unwrap().count, 1);

    let flags = table.get("moderate").unwrap().cutoff.flags(defas);
    let by_phase = rate_by(&dataset, "Fase", &flags).unwrap();
    let phase_two = by_phase
        .iter()
        .find(|r| r.key == GroupKey::Number(2.0))
        .unwrap();
    // Phase 2 holds A2, A3 and A7; A7's deficit is missing but still counts as a row
    assert_eq!(phase_two.rows, 3);
    assert_eq!(phase_two.flagged, 1);
}

#[test]
fn engagement_association() {
    let dataset = dataset();
    let ieg = dataset.numeric("IEG").unwrap();
    let ida = dataset.numeric("IDA").unwrap();
    let ipv = dataset.numeric("IPV").unwrap();

    let ida_assoc = Association::between(ieg, ida);
    assert_eq!(ida_assoc.pairs, 9);
    assert!(ida_assoc.pearson > 0.9);
    let reversed = Association::between(ida, ieg);
    assert!((ida_assoc.spearman - reversed.spearman).abs() < 1e-12);

    let classifier = Classifier::new(
        ieg,
        &[
            ("low", Rule::at_most_percentile(25.0)),
            ("high", Rule::at_least_percentile(75.0)),
        ],
        "intermediate",
    );
    let low = classifier.cutoff("low").unwrap().flags(ieg);
    let high = classifier.cutoff("high").unwrap().flags(ieg);
    let comparison = MeanComparison::compute(&low, &high, &[("IDA", ida), ("IPV", ipv)]);
    assert!(comparison.delta().iter().all(|d| *d > 0.0));
    assert_eq!(comparison.low.rows + comparison.high.rows, 6);
}

#[test]
fn overview_and_validation() {
    let dataset = dataset();
    let overview = column_overview(&dataset);
    assert_eq!(overview.len(), 10);
    assert!(
        overview
            .windows(2)
            .all(|w| w[0].missing_percent >= w[1].missing_percent)
    );

    let err = dataset
        .require_columns(&["IEG", "IPP", "IAA"])
        .unwrap_err();
    let LoadError::MissingColumns { missing, .. } = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(missing, vec!["IPP", "IAA"]);
}
