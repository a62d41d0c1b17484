use crate::record::JobRecord;

/// Discovery-ordered record list with an optional maximum size.
#[derive(Debug, Default)]
pub struct RecordAccumulator {
    records: Vec<JobRecord>,
    cap: Option<usize>,
}

impl RecordAccumulator {
    /// `cap` of `None` or `Some(0)` means unbounded.
    pub fn new(cap: Option<usize>) -> Self {
        Self {
            records: Vec::new(),
            cap: cap.filter(|&n| n > 0),
        }
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_full(&self) -> bool {
        self.cap.is_some_and(|cap| self.records.len() >= cap)
    }

    /// Appends unless the cap is already reached. Returns whether the record was kept.
    pub fn append(&mut self, record: JobRecord) -> bool {
        if self.is_full() {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Final records, cut to the first `cap` in discovery order.
    pub fn into_records(mut self) -> Vec<JobRecord> {
        if let Some(cap) = self.cap {
            self.records.truncate(cap);
        }
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Summary;

    fn record(title: &str) -> JobRecord {
        JobRecord {
            title: title.to_string(),
            location: String::new(),
            experience_required: String::new(),
            skills_required: String::new(),
            salary: String::new(),
            job_url: String::new(),
            description_summary: Summary::Text(String::new()),
        }
    }

    #[test]
    fn test_unbounded_keeps_everything_in_order() {
        let mut acc = RecordAccumulator::new(None);
        for title in ["a", "b", "c"] {
            assert!(acc.append(record(title)));
        }

        assert!(!acc.is_full());
        let titles: Vec<_> = acc.into_records().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }

    #[test]
    fn test_cap_stops_appends() {
        let mut acc = RecordAccumulator::new(Some(2));
        assert!(acc.append(record("a")));
        assert!(!acc.is_full());
        assert!(acc.append(record("b")));
        assert!(acc.is_full());
        assert!(!acc.append(record("c")));

        assert_eq!(acc.count(), 2);
        let titles: Vec<_> = acc.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["a", "b"]);
    }

    #[test]
    fn test_zero_cap_is_unbounded() {
        let acc = RecordAccumulator::new(Some(0));
        assert_eq!(acc.cap, None);
        assert!(!acc.is_full());
    }
}
