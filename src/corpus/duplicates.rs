// Duplicate aggregation across corpora.
//
// Works on comparison sets (one deduplicated fragment set per app), so a
// fragment's "count" is the number of applications that contain it, not
// how often it appears inside any one binary.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::resources::ResourceFile;

/// Default length of the ranked top-duplicate list.
pub const DEFAULT_TOP_N: usize = 20;

/// A fragment shared by two or more applications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub content: String,
    /// Owning applications, sorted.
    pub apps: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateStatistics {
    /// Sum of every app's unique fragment count.
    pub total_occurrences: usize,
    /// Size of the union across all apps.
    pub unique_fragments: usize,
    /// Sum over shared fragments of (k - 1).
    pub duplicate_count: usize,
    /// duplicate_count / total_occurrences * 100, or 0 when empty.
    pub duplication_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateAnalysis {
    /// k to the fragments held by exactly k apps. Within a group, longer
    /// fragments come first.
    pub groups: BTreeMap<usize, Vec<DuplicateEntry>>,
    pub statistics: DuplicateStatistics,
}

impl DuplicateAnalysis {
    /// Groups in descending k order.
    pub fn groups_descending(&self) -> impl Iterator<Item = (&usize, &Vec<DuplicateEntry>)> {
        self.groups.iter().rev()
    }

    /// k to the number of fragments shared by exactly k apps.
    pub fn distribution(&self) -> BTreeMap<usize, usize> {
        self.groups.iter().map(|(k, v)| (*k, v.len())).collect()
    }

    /// Every shared fragment ranked by app count, then length, then text.
    pub fn top(&self, n: usize) -> Vec<DuplicateEntry> {
        let mut all: Vec<DuplicateEntry> = self.groups.values().flatten().cloned().collect();
        all.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| char_len(&b.content).cmp(&char_len(&a.content)))
                .then_with(|| a.content.cmp(&b.content))
        });
        all.truncate(n);
        all
    }

    pub fn shared_fragment_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Aggregate shared fragments across per-app comparison sets.
pub fn aggregate(sets: &BTreeMap<String, BTreeSet<String>>) -> DuplicateAnalysis {
    let mut owners: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (app, set) in sets {
        for fragment in set {
            owners.entry(fragment.as_str()).or_default().push(app.as_str());
        }
    }

    let total_occurrences: usize = sets.values().map(BTreeSet::len).sum();
    let unique_fragments = owners.len();

    let mut groups: BTreeMap<usize, Vec<DuplicateEntry>> = BTreeMap::new();
    let mut duplicate_count = 0;
    for (content, apps) in owners {
        let k = apps.len();
        if k < 2 {
            continue;
        }
        duplicate_count += k - 1;
        groups.entry(k).or_default().push(DuplicateEntry {
            content: content.to_string(),
            apps: apps.into_iter().map(str::to_string).collect(),
            count: k,
        });
    }

    for entries in groups.values_mut() {
        entries.sort_by(|a, b| {
            char_len(&b.content)
                .cmp(&char_len(&a.content))
                .then_with(|| a.content.cmp(&b.content))
        });
    }

    let duplication_rate = if total_occurrences > 0 {
        duplicate_count as f64 / total_occurrences as f64 * 100.0
    } else {
        0.0
    };

    DuplicateAnalysis {
        groups,
        statistics: DuplicateStatistics {
            total_occurrences,
            unique_fragments,
            duplicate_count,
            duplication_rate,
        },
    }
}

/// A resource file that appears more than once, matched by name and size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDuplicate {
    pub name: String,
    pub size: u64,
    pub category: String,
    /// One entry per copy, so an app holding two copies appears twice.
    pub apps: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDuplicateAnalysis {
    /// Ordered by wasted bytes, largest first.
    pub duplicates: Vec<ResourceDuplicate>,
    /// Sum over duplicates of (count - 1).
    pub redundant_files: usize,
    /// Sum over duplicates of (count - 1) * size.
    pub potential_savings: u64,
}

/// Find resources duplicated across (or within) applications.
pub fn aggregate_resources<'a, I>(apps: I) -> ResourceDuplicateAnalysis
where
    I: IntoIterator<Item = (&'a str, &'a [ResourceFile])>,
{
    let mut groups: BTreeMap<(&str, u64), Vec<(&str, &str)>> = BTreeMap::new();
    for (app, files) in apps {
        for file in files {
            groups
                .entry((file.name.as_str(), file.size))
                .or_default()
                .push((app, file.category.as_str()));
        }
    }

    let mut duplicates: Vec<ResourceDuplicate> = groups
        .into_iter()
        .filter(|(_, copies)| copies.len() > 1)
        .map(|((name, size), copies)| {
            let category = copies[0].1.to_string();
            let mut apps: Vec<String> = copies.iter().map(|(app, _)| app.to_string()).collect();
            apps.sort();
            ResourceDuplicate {
                name: name.to_string(),
                size,
                category,
                count: apps.len(),
                apps,
            }
        })
        .collect();

    duplicates.sort_by(|a, b| {
        let waste_a = (a.count as u64 - 1) * a.size;
        let waste_b = (b.count as u64 - 1) * b.size;
        waste_b.cmp(&waste_a).then_with(|| a.name.cmp(&b.name))
    });

    let redundant_files = duplicates.iter().map(|d| d.count - 1).sum();
    let potential_savings = duplicates
        .iter()
        .map(|d| (d.count as u64 - 1) * d.size)
        .sum();

    ResourceDuplicateAnalysis {
        duplicates,
        redundant_files,
        potential_savings,
    }
}
