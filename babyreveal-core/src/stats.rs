use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::{Gender, Vote};

/// Aggregated results over all votes, as shown on the results page
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteStats {
    pub total: usize,
    pub girl: usize,
    pub boy: usize,
    pub girl_percent: u32,
    pub boy_percent: u32,
    /// Rounded mean of the weight predictions, in grams
    pub average_weight: Option<u32>,
    /// Rounded mean of the height predictions, in centimeters
    pub average_height: Option<u32>,
    pub hair_colors: BTreeMap<String, usize>,
    pub eye_colors: BTreeMap<String, usize>,
    /// Most predicted dates first
    pub birth_dates: Vec<DateCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateCount {
    pub date: String,
    pub count: usize,
}

impl VoteStats {
    pub fn from_votes(votes: &[Vote]) -> Self {
        let total = votes.len();
        let girl = votes.iter().filter(|v| v.choice == Gender::Girl).count();
        let boy = total - girl;

        let predictions = || votes.iter().map(|v| &v.predictions);

        Self {
            total,
            girl,
            boy,
            girl_percent: percent(girl, total),
            boy_percent: percent(boy, total),
            average_weight: average(predictions().filter_map(|p| p.weight)),
            average_height: average(predictions().filter_map(|p| p.height)),
            hair_colors: count(predictions().filter_map(|p| p.hair_color.as_deref())),
            eye_colors: count(predictions().filter_map(|p| p.eye_color.as_deref())),
            birth_dates: ranked_dates(predictions().filter_map(|p| p.birth_date.as_deref())),
        }
    }
}

fn percent(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }

    (count as f64 * 100. / total as f64).round() as u32
}

fn average(values: impl Iterator<Item = u32>) -> Option<u32> {
    let (sum, len) = values.fold((0u64, 0u64), |(sum, len), v| (sum + v as u64, len + 1));

    (len > 0).then(|| (sum as f64 / len as f64).round() as u32)
}

fn count<'a>(labels: impl Iterator<Item = &'a str>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    for label in labels {
        *counts.entry(label.to_string()).or_insert(0) += 1;
    }

    counts
}

fn ranked_dates<'a>(dates: impl Iterator<Item = &'a str>) -> Vec<DateCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for date in dates {
        *counts.entry(date).or_insert(0) += 1;
    }

    let mut ranked: Vec<_> = counts
        .into_iter()
        .map(|(date, count)| DateCount {
            date: date.to_string(),
            count,
        })
        .collect();

    ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.date.cmp(&b.date)));
    ranked
}
