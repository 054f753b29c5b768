//! Indicator profiling for student-level PEDE data
//!
//! This crate turns one in-memory table of student indicators into the
//! statistics behind the PEDE reports. Every stage reads the same immutable
//! [`dataset::Dataset`]; nothing is cached between runs.
//!
//! # Overview
//!
//! 1. **Load and Validate** ([`dataset::Dataset`]): read CSV/JSON, coerce numeric
//!    candidates, fail on absent input or absent required columns
//! 2. **Summarize** ([`distribution::DistributionSummary`]): counts, mean, median,
//!    percentiles and frequency tables of the primary indicator
//! 3. **Classify** ([`cutoff::RateTable`], [`cutoff::Classifier`]): bucket rates from
//!    fixed or percentile cutoffs
//! 4. **Aggregate** ([`grouping::GroupedStats`]): per-group count/mean/median and
//!    per-group bucket rates
//! 5. **Associate** ([`association::Association`]): Pearson and Spearman correlation
//!    and the low/high mean comparison
//!
//! [`profile::IndicatorProfile`] runs steps 2 and 4 with the standard groupings.
//! [`overview::column_overview`] describes every column of the dataset.
//!
//! # Missing Values
//!
//! Unparseable and empty cells are missing. Missing cells never reach a
//! statistic; undefined results are NaN rather than errors. The only failures
//! are structural: an absent input file or absent required columns.
//!
//! # Examples
//!
//! ```
//! use pede_analysis::{
//!     cutoff::{Criterion, RateTable, Rule},
//!     dataset::Dataset,
//!     profile::{IndicatorProfile, ProfileColumns},
//! };
//!
//! let csv = "\
//! IDA,Ano ingresso,Idade 22,Fase,Pedra 22
//! 4.0,2019,12,1,Quartzo
//! 6.5,2020,12,2,Ágata
//! 8.0,2020,13,2,Ametista
//! ,2021,14,3,Quartzo
//! ";
//! let dataset = Dataset::from_csv_reader(csv.as_bytes()).unwrap();
//! let columns = ProfileColumns {
//!     cohort: "Ano ingresso",
//!     age: "Idade 22",
//!     phase: "Fase",
//!     tier: "Pedra 22",
//! };
//!
//! let profile = IndicatorProfile::build(&dataset, "IDA", &columns, 10).unwrap();
//! assert_eq!(profile.summary.present, 3);
//! assert_eq!(profile.by_cohort.rows.len(), 3);
//!
//! let ida = dataset.numeric("IDA").unwrap();
//! let rates = RateTable::compute(ida, &[Criterion::new("low", Rule::at_most_percentile(25.0))]);
//! assert_eq!(rates.rows[0].present, 3);
//! ```

pub mod association;
pub mod cutoff;
pub mod dataset;
pub mod distribution;
pub mod grouping;
pub mod overview;
pub mod profile;
