//! Dashboard-side aggregation of the raw per-stage counters: the summary
//! strip groups the long tail of procedural stages into a fixed, readable
//! set of buckets.

use std::collections::HashMap;

use shared::protocol::ProcStageOption;

/// Stages shown individually, in legislative order.
pub const MAIN_STAGES: [&str; 4] = ["접수", "소관위접수", "소관위심사", "본회의의결"];

/// Terminal stages folded into the single "처리완료" bucket.
pub const COMPLETED_STAGES: [&str; 6] = [
    "공포",
    "정부이송",
    "대안반영폐기",
    "철회",
    "본회의불부의",
    "재의(부결)",
];

pub const COMPLETED_LABEL: &str = "처리완료";
pub const OTHER_LABEL: &str = "기타";

/// Stages promoted to the top of the filter dropdown, ahead of the
/// remainder in server order.
pub const PROMOTED_OPTION_STAGES: [&str; 8] = [
    "접수",
    "소관위접수",
    "소관위심사",
    "본회의의결",
    "공포",
    "정부이송",
    "대안반영폐기",
    "철회",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCount {
    pub label: String,
    pub count: u64,
}

/// Collapses raw per-stage counts into the dashboard's summary buckets:
/// the four main stages in order, one completed bucket, one catch-all.
/// Empty buckets are dropped.
pub fn stage_rollup(proc_stage_stats: &HashMap<String, u64>) -> Vec<StageCount> {
    let mut rollup = Vec::new();
    for stage in MAIN_STAGES {
        if let Some(&count) = proc_stage_stats.get(stage) {
            if count > 0 {
                rollup.push(StageCount {
                    label: stage.to_string(),
                    count,
                });
            }
        }
    }

    let completed: u64 = COMPLETED_STAGES
        .iter()
        .filter_map(|stage| proc_stage_stats.get(*stage))
        .sum();
    if completed > 0 {
        rollup.push(StageCount {
            label: COMPLETED_LABEL.to_string(),
            count: completed,
        });
    }

    let other: u64 = proc_stage_stats
        .iter()
        .filter(|(stage, _)| {
            !MAIN_STAGES.contains(&stage.as_str()) && !COMPLETED_STAGES.contains(&stage.as_str())
        })
        .map(|(_, count)| count)
        .sum();
    if other > 0 {
        rollup.push(StageCount {
            label: OTHER_LABEL.to_string(),
            count: other,
        });
    }

    rollup
}

/// Orders the stage filter options promoted-stages-first, keeping the
/// server's order for the rest.
pub fn order_proc_stage_options(options: Vec<ProcStageOption>) -> Vec<ProcStageOption> {
    let mut ordered = Vec::with_capacity(options.len());
    for stage in PROMOTED_OPTION_STAGES {
        if let Some(option) = options.iter().find(|o| o.proc_stage_cd == stage) {
            ordered.push(option.clone());
        }
    }
    for option in options {
        if !PROMOTED_OPTION_STAGES.contains(&option.proc_stage_cd.as_str()) {
            ordered.push(option);
        }
    }
    ordered
}

/// Percentage of `count` out of `total`, 0.0 for an empty total.
pub fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(pairs: &[(&str, u64)]) -> HashMap<String, u64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn rollup_keeps_main_stage_order_and_folds_terminal_stages() {
        let rollup = stage_rollup(&stats(&[
            ("공포", 10),
            ("접수", 120),
            ("철회", 5),
            ("본회의의결", 30),
            ("소관위심사", 80),
        ]));
        let labels: Vec<&str> = rollup.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["접수", "소관위심사", "본회의의결", "처리완료"]);
        assert_eq!(rollup[3].count, 15);
    }

    #[test]
    fn unknown_stages_land_in_the_catch_all_bucket() {
        let rollup = stage_rollup(&stats(&[
            ("접수", 1),
            ("체계자구심사", 7),
            ("미분류", 2),
        ]));
        let other = rollup.iter().find(|s| s.label == OTHER_LABEL).unwrap();
        assert_eq!(other.count, 9);
    }

    #[test]
    fn empty_stats_produce_an_empty_rollup() {
        assert!(stage_rollup(&HashMap::new()).is_empty());
    }

    #[test]
    fn promoted_stages_come_first_in_option_order() {
        let options = vec![
            ProcStageOption {
                proc_stage_cd: "체계자구심사".into(),
                bill_count: 40,
            },
            ProcStageOption {
                proc_stage_cd: "소관위접수".into(),
                bill_count: 200,
            },
            ProcStageOption {
                proc_stage_cd: "접수".into(),
                bill_count: 300,
            },
        ];
        let ordered = order_proc_stage_options(options);
        let names: Vec<&str> = ordered.iter().map(|o| o.proc_stage_cd.as_str()).collect();
        assert_eq!(names, vec!["접수", "소관위접수", "체계자구심사"]);
    }

    #[test]
    fn percent_handles_zero_totals() {
        assert_eq!(percent(5, 0), 0.0);
        assert!((percent(1, 4) - 25.0).abs() < f64::EPSILON);
    }
}
