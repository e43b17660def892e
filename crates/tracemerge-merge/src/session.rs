//! The merge session: one series state plus one state per section.

use std::path::{Path, PathBuf};

use tracemerge_store::SeriesWriter;
use tracemerge_types::Series;

use crate::config::MergeConfig;
use crate::error::{MergeError, MergeResult};
use crate::quick::QuickMerge;
use crate::section::SectionMergeState;
use crate::series::SeriesMergeState;

/// Source-name suffix stripped before the merge suffix is appended.
const SERIES_EXTENSION: &str = ".ser";

/// Aggregate of every merge state built from one source series.
///
/// States are addressed by position: index 0 is the series state and index
/// `n` is the section state for the `n`th source section.
#[derive(Clone, Debug)]
pub struct MergeSession {
    config: MergeConfig,
    series: SeriesMergeState,
    sections: Vec<SectionMergeState>,
}

impl MergeSession {
    /// Build every state and categorize every section.
    ///
    /// Fails on an invalid configuration or on the first section whose
    /// categorization fails.
    pub fn new(source: Series, config: MergeConfig) -> MergeResult<Self> {
        config.validate()?;

        let series = SeriesMergeState::new(&source, config.zcontours_gate_completion);
        let contours = source.contour_count();
        let sections = source
            .sections
            .into_iter()
            .map(|section| SectionMergeState::new(section, &config))
            .collect::<MergeResult<Vec<_>>>()?;

        let session = Self {
            config,
            series,
            sections,
        };
        tracing::info!(
            series = %session.name(),
            sections = session.sections.len(),
            contours,
            pending = session.pending_conflicts(),
            "opened merge session"
        );
        Ok(session)
    }

    pub fn name(&self) -> &str {
        self.series.name()
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn series(&self) -> &SeriesMergeState {
        &self.series
    }

    pub fn series_mut(&mut self) -> &mut SeriesMergeState {
        &mut self.series
    }

    pub fn sections(&self) -> &[SectionMergeState] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&SectionMergeState> {
        self.sections.get(index)
    }

    pub fn section_mut(&mut self, index: usize) -> Option<&mut SectionMergeState> {
        self.sections.get_mut(index)
    }

    /// Number of addressable states (series plus sections).
    pub fn state_count(&self) -> usize {
        self.sections.len() + 1
    }

    // ---------------------------------------------------------------
    // Progress
    // ---------------------------------------------------------------

    pub fn is_done(&self) -> bool {
        self.series.is_done() && self.sections.iter().all(SectionMergeState::is_done)
    }

    /// Names of states that are not done, series first.
    pub fn unresolved(&self) -> Vec<&str> {
        std::iter::once(&self.series)
            .filter(|s| !s.is_done())
            .map(SeriesMergeState::name)
            .chain(
                self.sections
                    .iter()
                    .filter(|s| !s.is_done())
                    .map(SectionMergeState::name),
            )
            .collect()
    }

    /// `(done states, total states)`.
    pub fn progress(&self) -> (usize, usize) {
        let done = usize::from(self.series.is_done())
            + self.sections.iter().filter(|s| s.is_done()).count();
        (done, self.state_count())
    }

    /// Potential-duplicate pairs still awaiting a choice across all sections.
    pub fn pending_conflicts(&self) -> usize {
        self.sections.iter().map(SectionMergeState::pending_count).sum()
    }

    // ---------------------------------------------------------------
    // Quick merge
    // ---------------------------------------------------------------

    /// Apply `policy` to the states at `targets`.
    ///
    /// All indices are checked before any state changes. The series state
    /// (index 0) always resolves to its source values.
    pub fn quick_merge(&mut self, targets: &[usize], policy: QuickMerge) -> MergeResult<()> {
        let len = self.state_count();
        if let Some(&index) = targets.iter().find(|&&i| i >= len) {
            return Err(MergeError::StateOutOfRange { index, len });
        }

        for &index in targets {
            match index {
                0 => self.series.use_source(),
                n => self.sections[n - 1].apply_quick_merge(policy)?,
            }
        }
        tracing::debug!(states = targets.len(), %policy, "applied quick merge");
        Ok(())
    }

    /// Apply `policy` to every state.
    pub fn quick_merge_all(&mut self, policy: QuickMerge) -> MergeResult<()> {
        let targets: Vec<usize> = (0..self.state_count()).collect();
        self.quick_merge(&targets, policy)
    }

    // ---------------------------------------------------------------
    // Output
    // ---------------------------------------------------------------

    /// Name of the written series: the source name without a trailing
    /// `.ser`, followed by the configured suffix.
    pub fn merged_name(&self) -> String {
        let base = self
            .name()
            .strip_suffix(SERIES_EXTENSION)
            .unwrap_or(self.name());
        format!("{base}{}", self.config.name_suffix)
    }

    /// Materialize the output series with every section in source order.
    pub fn to_series(&self) -> Series {
        let mut series = self.series.to_series();
        series.name = self.merged_name();
        series.sections = self.sections.iter().map(SectionMergeState::to_section).collect();
        series
    }

    /// Hand the materialized series to `writer`.
    ///
    /// Pending fields fall back to the source. Every call writes again.
    pub fn write(&self, writer: &dyn SeriesWriter, output_dir: &Path) -> MergeResult<PathBuf> {
        if !self.is_done() {
            tracing::warn!(
                series = %self.name(),
                unresolved = ?self.unresolved(),
                "writing incomplete merge; pending fields use source values"
            );
        }
        let series = self.to_series();
        let path = writer.write_series(&series, output_dir)?;
        tracing::info!(series = %series.name, path = %path.display(), "wrote merged series");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::PairChoice;
    use tracemerge_store::InMemorySeriesStore;
    use tracemerge_types::{Contour, Section, Shape, ZContour, ZPoint};

    fn square(name: &str, x: f64, size: f64) -> Contour {
        Contour::new(
            name,
            Shape::polygon([(x, 0.0), (x + size, 0.0), (x + size, size), (x, size)]),
        )
    }

    fn source() -> Series {
        let mut series = Series::new("cortex.ser").with_sections(vec![
            Section::new("cortex.1", 1).with_contours(vec![square("cell1", 0.0, 5.0)]),
            Section::new("cortex.2", 2).with_contours(vec![
                square("cell1", 0.0, 10.0),
                square("cell1", 6.0, 10.0),
            ]),
        ]);
        series.contours.push(Contour::new("palette", Shape::point(0.0, 0.0)));
        series
            .zcontours
            .push(ZContour::new("axon", vec![ZPoint { x: 0.0, y: 0.0, section: 1 }]));
        series
    }

    fn session() -> MergeSession {
        MergeSession::new(source(), MergeConfig::default()).unwrap()
    }

    #[test]
    fn one_state_per_section_in_order() {
        let s = session();
        assert_eq!(s.name(), "cortex.ser");
        assert_eq!(s.state_count(), 3);
        let names: Vec<_> = s.sections().iter().map(SectionMergeState::name).collect();
        assert_eq!(names, vec!["cortex.1", "cortex.2"]);
        assert_eq!(s.pending_conflicts(), 1);
        assert!(s.series().source().sections.is_empty());
    }

    #[test]
    fn fresh_session_is_not_done() {
        let s = session();
        assert!(!s.is_done());
        assert_eq!(s.unresolved(), vec!["cortex.ser", "cortex.1", "cortex.2"]);
        assert_eq!(s.progress(), (0, 3));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = MergeSession::new(source(), MergeConfig::default().with_threshold(0.9))
            .unwrap_err();
        assert!(matches!(err, MergeError::Config(_)));
    }

    #[test]
    fn merged_name_strips_extension() {
        assert_eq!(session().merged_name(), "cortexmerged");

        let config = MergeConfig {
            name_suffix: "-merged".into(),
            ..MergeConfig::default()
        };
        let s = MergeSession::new(Series::new("plain"), config).unwrap();
        assert_eq!(s.merged_name(), "plain-merged");
    }

    #[test]
    fn manual_resolution_reaches_done() {
        let mut s = session();
        s.section_mut(0).unwrap().resolve_contours().unwrap();
        let second = s.section_mut(1).unwrap();
        second.choose(0, PairChoice::First).unwrap();
        second.resolve_contours().unwrap();
        assert_eq!(s.unresolved(), vec!["cortex.ser"]);

        s.series_mut().use_source();
        assert!(s.is_done());
        assert_eq!(s.progress(), (3, 3));
    }

    #[test]
    fn unresolved_series_contours_fall_back_to_source() {
        let mut s = session();
        s.quick_merge(&[1, 2], QuickMerge::Both).unwrap();
        assert!(s.sections().iter().all(SectionMergeState::is_done));
        assert!(s.series().contours().is_pending());

        let store = InMemorySeriesStore::new();
        let path = s.write(&store, Path::new("/out")).unwrap();
        assert_eq!(path, PathBuf::from("/out/cortexmerged.json"));

        let written = store.last_written().unwrap();
        assert_eq!(written.contours, source().contours);
        assert_eq!(written.sections.len(), 2);
        assert_eq!(written.sections[1].contours.len(), 2);
    }

    #[test]
    fn quick_merge_rejects_out_of_range_without_side_effects() {
        let mut s = session();
        let err = s.quick_merge(&[0, 3], QuickMerge::First).unwrap_err();
        assert!(matches!(err, MergeError::StateOutOfRange { index: 3, len: 3 }));
        assert!(s.series().attributes().is_pending());
    }

    #[test]
    fn quick_merge_all_completes_session() {
        let mut s = session();
        s.quick_merge_all(QuickMerge::Second).unwrap();
        assert!(s.is_done());
        let out = s.to_series();
        assert_eq!(out.name, "cortexmerged");
        assert_eq!(out.sections[1].contours.len(), 1);
        assert_eq!(out.sections[1].contours[0].shape.coords()[0].x, 6.0);
    }

    #[test]
    fn repeated_writes_are_independent() {
        let mut s = session();
        s.quick_merge_all(QuickMerge::First).unwrap();
        let store = InMemorySeriesStore::new();
        s.write(&store, Path::new("/out")).unwrap();
        s.write(&store, Path::new("/out")).unwrap();
        assert_eq!(store.write_count(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn incomplete_session_still_writes() {
        let s = session();
        let store = InMemorySeriesStore::new();
        s.write(&store, Path::new("/out")).unwrap();
        let written = store.last_written().unwrap();
        assert_eq!(written.sections[1].contours, source().sections[1].contours);
    }

    #[test]
    fn categorization_failure_names_the_section() {
        let elevated = |x: f64| {
            Contour::new(
                "cell1",
                Shape::polygon_with_elevation([
                    (x, 0.0, 2.0),
                    (x + 10.0, 0.0, 2.0),
                    (x + 10.0, 10.0, 2.0),
                    (x, 10.0, 2.0),
                ])
                .unwrap(),
            )
        };
        let series = Series::new("z.ser").with_sections(vec![
            Section::new("z.4", 4).with_contours(vec![elevated(0.0), elevated(4.0)]),
        ]);
        let err = MergeSession::new(series, MergeConfig::default()).unwrap_err();
        match err {
            MergeError::Categorize { section, .. } => assert_eq!(section, "z.4"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
