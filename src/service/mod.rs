//! Exchange service
//!
//! Ties the record store, the resolver and persistence together: this is
//! what the CLI and the HTTP handlers call. Persistence failures are logged
//! and the service keeps running on its in-memory state.

use crate::aggregate::{build_markers, group_by_destination, MapMarker};
use crate::config::defaults::DEFAULT_CSV_PATH;
use crate::config::Config;
use crate::constants::api::GEOCODE_INTERVAL_MS;
use crate::constants::storage::{COORDINATES_KEY, EXCHANGES_KEY};
use crate::error::{Error, Result};
use crate::exchange::{ExchangeRecord, NewExchange};
use crate::geo::manual::ManualTable;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{
    get_geocoder, BatchResolver, CoordinateCache, CoordinateResolver, GeoBackend, Resolution,
};
use crate::store::csv::{read_exchanges, to_csv_string, RejectedRow};
use crate::store::{ExchangeStore, FilterState, JsonFileStore, KeyValueStore, Stats};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Outcome of a CSV import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Records added to the store
    pub imported: usize,
    /// Rows the CSV reader could not decode
    pub rejected: Vec<RejectedRow>,
    /// Rows without a destination
    pub skipped: usize,
    /// New destinations that were looked up
    pub resolved: usize,
    /// New destinations still without a location
    pub unlocated: usize,
}

/// Where the initial data came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Persisted,
    /// Read from the exchange file, with what was kept and dropped
    Csv(ImportReport),
}

/// Imported rows whose new destinations still need a lookup
#[derive(Debug)]
pub struct PendingImport {
    report: ImportReport,
    destinations: Vec<String>,
}

impl PendingImport {
    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }
}

/// Rate-limited lookups that can run without borrowing the service
pub struct DestinationLookup<B> {
    resolver: Arc<CoordinateResolver<B>>,
    interval: Duration,
}

impl<B: GeoBackend> DestinationLookup<B> {
    /// Resolve destinations in order; located results land in the shared cache
    pub async fn resolve_each(&self, destinations: Vec<String>) -> Vec<(String, Resolution)> {
        BatchResolver::new(&*self.resolver)
            .with_interval(self.interval)
            .resolve_each(destinations)
            .await
    }
}

/// Facade over store, resolver and persistence
pub struct ExchangeService<B> {
    store: ExchangeStore,
    resolver: Arc<CoordinateResolver<B>>,
    persist: Box<dyn KeyValueStore>,
    interval: Duration,
    csv_path: PathBuf,
}

impl ExchangeService<NominatimBackend> {
    /// Build a service from configuration: Nominatim plus the JSON file store
    ///
    /// An unreadable store file is set aside and the service starts empty.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = get_geocoder(config)?;
        let persist = JsonFileStore::open_or_reset(config.store_path()?);

        Ok(Self::new(backend, Box::new(persist))
            .with_interval(config.geocode_interval())
            .with_csv_path(&config.data.csv_path))
    }
}

impl<B: GeoBackend> ExchangeService<B> {
    /// Create an empty service
    pub fn new(backend: B, persist: Box<dyn KeyValueStore>) -> Self {
        let cache = Arc::new(CoordinateCache::new());
        Self {
            store: ExchangeStore::new(Arc::clone(&cache)),
            resolver: Arc::new(CoordinateResolver::new(backend, cache)),
            persist,
            interval: Duration::from_millis(GEOCODE_INTERVAL_MS),
            csv_path: PathBuf::from(DEFAULT_CSV_PATH),
        }
    }

    /// Override the pause between geocoder requests
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Exchange file read when nothing has been persisted
    pub fn with_csv_path(mut self, path: impl AsRef<Path>) -> Self {
        self.csv_path = path.as_ref().to_path_buf();
        self
    }

    /// Replace the curated coordinate table
    pub fn with_manual_table(mut self, manual: ManualTable) -> Self {
        self.resolver = match Arc::try_unwrap(self.resolver) {
            Ok(resolver) => Arc::new(resolver.with_manual_table(manual)),
            Err(shared) => {
                warn!("Resolver is already shared; manual table not replaced");
                shared
            }
        };
        self
    }

    pub fn store(&self) -> &ExchangeStore {
        &self.store
    }

    pub fn resolver(&self) -> &CoordinateResolver<B> {
        &self.resolver
    }

    /// A handle for resolving destinations outside a lock on the service
    pub fn lookup(&self) -> DestinationLookup<B> {
        DestinationLookup {
            resolver: Arc::clone(&self.resolver),
            interval: self.interval,
        }
    }

    /// Load persisted state, or read the exchange file and locate it
    pub async fn initialize(&mut self) -> Result<DataSource> {
        match self.store.load(self.persist.as_ref()) {
            Ok(true) => {
                info!(
                    "Loaded {} exchanges and {} coordinates from storage",
                    self.store.len(),
                    self.store.coordinates().len()
                );
                return Ok(DataSource::Persisted);
            }
            Ok(false) => {}
            Err(e) => error!("Error loading from storage: {}", e),
        }

        let file = File::open(&self.csv_path).map_err(|e| {
            Error::Persistence(format!("Failed to open {}: {}", self.csv_path.display(), e))
        })?;
        let import = read_exchanges(file)?;
        info!("Loaded {} exchanges from {}", import.rows.len(), self.csv_path.display());
        for row in &import.rejected {
            warn!(
                "Skipped line {} of {}: {}",
                row.line,
                self.csv_path.display(),
                row.reason
            );
        }

        let mut report = ImportReport {
            imported: import.rows.len(),
            rejected: import.rejected,
            skipped: import.skipped,
            ..ImportReport::default()
        };

        self.store.replace_all(import.rows);
        let destinations = self.store.unique_destinations();
        report.resolved = destinations.len();
        let results = self.lookup().resolve_each(destinations).await;
        report.unlocated = self.store_resolutions(results);
        self.save();

        Ok(DataSource::Csv(report))
    }

    /// Store every located result
    ///
    /// Returns how many of them are still unlocated.
    fn store_resolutions(&self, results: Vec<(String, Resolution)>) -> usize {
        let mut unlocated = 0;
        for (destination, resolution) in results {
            if resolution.coords.is_sentinel() {
                unlocated += 1;
            } else {
                self.store.set_coordinate(destination, resolution.coords);
            }
        }
        unlocated
    }

    /// Resolve one destination and store it if located
    async fn resolve_destination(&self, destination: &str) {
        let resolution = self.resolver.resolve(destination).await;
        if !resolution.coords.is_sentinel() {
            self.store.set_coordinate(destination, resolution.coords);
        }
    }

    fn save(&mut self) {
        if let Err(e) = self.store.save(self.persist.as_mut()) {
            error!("Error saving to storage: {}", e);
        }
    }

    /// Add a validated exchange and locate its destination
    pub async fn add(&mut self, fields: NewExchange) -> Result<ExchangeRecord> {
        let record = self.store.add(fields)?;
        if self.store.get_coordinate(&record.destination).is_none() {
            self.resolve_destination(&record.destination).await;
        }
        self.save();
        Ok(record)
    }

    /// Replace an exchange's fields, locating a new destination if needed
    pub async fn update(&mut self, id: u64, fields: NewExchange) -> Result<ExchangeRecord> {
        let record = self
            .store
            .update(id, fields)?
            .ok_or_else(|| Error::NotFound(format!("exchange {}", id)))?;
        if self.store.get_coordinate(&record.destination).is_none() {
            self.resolve_destination(&record.destination).await;
        }
        self.save();
        Ok(record)
    }

    pub fn delete(&mut self, id: u64) -> Result<()> {
        if !self.store.delete(id) {
            return Err(Error::NotFound(format!("exchange {}", id)));
        }
        self.save();
        Ok(())
    }

    /// Append every row of an exchange file and locate new destinations
    pub async fn import_csv<R: Read>(&mut self, reader: R) -> Result<ImportReport> {
        let pending = self.stage_import(reader)?;
        let results = self
            .lookup()
            .resolve_each(pending.destinations().to_vec())
            .await;
        Ok(self.finish_import(pending, results))
    }

    /// Append the rows of an exchange file without any lookups
    ///
    /// Follow with `lookup().resolve_each` on the pending destinations and
    /// `finish_import`. The lookups need no access to the service.
    pub fn stage_import<R: Read>(&mut self, reader: R) -> Result<PendingImport> {
        let import = read_exchanges(reader)?;
        let mut report = ImportReport {
            rejected: import.rejected,
            skipped: import.skipped,
            ..ImportReport::default()
        };

        let mut seen = HashSet::new();
        let mut destinations = Vec::new();
        for fields in import.rows {
            let record = self.store.append(fields)?;
            report.imported += 1;
            if self.store.get_coordinate(&record.destination).is_none()
                && seen.insert(record.destination.clone())
            {
                destinations.push(record.destination);
            }
        }
        report.resolved = destinations.len();
        self.save();

        Ok(PendingImport {
            report,
            destinations,
        })
    }

    /// Store the lookups for a staged import and persist
    pub fn finish_import(
        &mut self,
        pending: PendingImport,
        results: Vec<(String, Resolution)>,
    ) -> ImportReport {
        let mut report = pending.report;
        report.unlocated = self.store_resolutions(results);
        self.save();

        info!(
            "Imported {} exchanges ({} rejected, {} new destinations)",
            report.imported,
            report.rejected.len(),
            report.resolved
        );
        report
    }

    /// All exchanges as a `;`-delimited file
    pub fn export_csv(&self) -> Result<String> {
        to_csv_string(self.store.exchanges())
    }

    /// Drop all records and coordinates, in memory and in storage
    pub fn clear(&mut self) {
        self.store.clear();
        for key in [EXCHANGES_KEY, COORDINATES_KEY] {
            if let Err(e) = self.persist.remove(key) {
                error!("Error clearing {} from storage: {}", key, e);
            }
        }
        info!("All exchange data cleared");
    }

    pub fn filter(&self, filter: &FilterState) -> Vec<&ExchangeRecord> {
        self.store.filter(filter)
    }

    /// Markers for every located destination among the filtered exchanges
    pub fn markers(&self, filter: &FilterState) -> Vec<MapMarker> {
        let groups = group_by_destination(self.store.filter(filter));
        build_markers(groups, self.store.coordinates())
    }

    /// Counts over the filtered exchanges
    pub fn stats(&self, filter: &FilterState) -> Stats {
        Stats::of(self.store.filter(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinates;
    use crate::exchange::Category;
    use crate::geo::testing::MockGeocoder;
    use crate::store::MemoryStore;
    use tempfile::TempDir;

    const SAMPLE: &str = "\
Destination;Aktivitet;Kurs/besökande skola;Enhet;
Porto, Portugal;Praktik;Vård;Gymnasiet;Erasmus
Porto, Portugal;Studiebesök;;Gymnasiet;Nordplus
Wien, Österrike;Praktik;;Grundskolan;TCA
Oulu, Finland;Praktik;;Gymnasiet;Atlas
Atlantis, Okänt;Praktik;;Gymnasiet;Erasmus
";

    fn backend() -> MockGeocoder {
        MockGeocoder::new().with_result("Oulu, Finland", 65.0121, 25.4651)
    }

    fn service(backend: MockGeocoder) -> ExchangeService<MockGeocoder> {
        ExchangeService::new(backend, Box::new(MemoryStore::new())).with_interval(Duration::ZERO)
    }

    fn write_sample(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("Utbyten.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[tokio::test]
    async fn test_initialize_from_csv() {
        let dir = TempDir::new().unwrap();
        let mut service = service(backend()).with_csv_path(write_sample(&dir));

        let source = service.initialize().await.unwrap();
        let DataSource::Csv(report) = source else {
            panic!("expected data from the exchange file");
        };
        assert_eq!(report.imported, 5);
        assert_eq!(report.resolved, 4);
        assert_eq!(report.unlocated, 1);
        assert_eq!(service.store().len(), 5);

        // Porto and Wien from the manual table, Oulu geocoded, Atlantis unlocated
        let coords = service.store().coordinates();
        assert_eq!(coords.len(), 3);
        assert_eq!(
            coords.get("Oulu, Finland"),
            Some(Coordinates::new(65.0121, 25.4651))
        );
        assert!(coords.get("Atlantis, Okänt").is_none());
        assert_eq!(service.resolver().backend().call_count(), 2);
    }

    #[tokio::test]
    async fn test_initialize_prefers_persisted_state() {
        let dir = TempDir::new().unwrap();
        let mut first = service(backend()).with_csv_path(write_sample(&dir));
        first.initialize().await.unwrap();

        let mut persist = MemoryStore::new();
        first.store().save(&mut persist).unwrap();

        let mut second = ExchangeService::new(MockGeocoder::new(), Box::new(persist))
            .with_csv_path(dir.path().join("missing.csv"));
        assert_eq!(second.initialize().await.unwrap(), DataSource::Persisted);
        assert_eq!(second.store().len(), 5);
        assert_eq!(second.resolver().backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_initialize_keeps_rows_without_activity_or_school() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Utbyten.csv");
        std::fs::write(
            &path,
            "Destination;Aktivitet;Kurs/besökande skola;Enhet;\n\
             Porto, Portugal;Praktik;;Gymnasiet;Erasmus\n\
             Bergen, Norge;;;Gymnasiet;Nordplus\n\
             Wien, Österrike;Studiebesök;;;TCA\n",
        )
        .unwrap();
        let mut service = service(backend()).with_csv_path(path);

        service.initialize().await.unwrap();

        assert_eq!(service.store().len(), 3);
        assert_eq!(service.store().exchanges()[1].activity, "");
        assert_eq!(service.store().exchanges()[2].school, "");
        assert_eq!(service.markers(&FilterState::default()).len(), 3);
    }

    #[tokio::test]
    async fn test_initialize_reports_undecodable_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Utbyten.csv");
        let mut content = SAMPLE.as_bytes().to_vec();
        content.extend_from_slice(b"Bergen;\xff;;Gymnasiet;Nordplus\n");
        std::fs::write(&path, content).unwrap();
        let mut service = service(backend()).with_csv_path(path);

        let DataSource::Csv(report) = service.initialize().await.unwrap() else {
            panic!("expected data from the exchange file");
        };

        assert_eq!(service.store().len(), 5);
        assert_eq!(report.imported, 5);
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].line, 7);
    }

    #[test]
    fn test_from_config_survives_damaged_store_file() {
        let dir = TempDir::new().unwrap();
        let store_path = dir.path().join("store.json");
        std::fs::write(&store_path, r#"{"exchanges": "["#).unwrap();

        let mut config = Config::default();
        config.data.store_path = store_path.display().to_string();
        config.data.csv_path = write_sample(&dir).display().to_string();

        let service = ExchangeService::from_config(&config).unwrap();
        assert!(service.store().is_empty());
        assert!(dir.path().join("store.json.corrupt").exists());
    }

    #[tokio::test]
    async fn test_initialize_missing_csv() {
        let dir = TempDir::new().unwrap();
        let mut service = service(backend()).with_csv_path(dir.path().join("missing.csv"));
        assert!(service.initialize().await.is_err());
    }

    #[tokio::test]
    async fn test_markers_skip_unlocated() {
        let dir = TempDir::new().unwrap();
        let mut service = service(backend()).with_csv_path(write_sample(&dir));
        service.initialize().await.unwrap();

        let markers = service.markers(&FilterState::default());
        let destinations: Vec<&str> = markers.iter().map(|m| m.destination.as_str()).collect();
        assert_eq!(destinations, vec!["Porto, Portugal", "Wien, Österrike", "Oulu, Finland"]);
        assert_eq!(markers[0].records.len(), 2);
        assert_eq!(markers[0].category, Category::Erasmus);

        let filtered = service.markers(
            &FilterState::default().with_categories([Category::Nordplus]),
        );
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].category, Category::Nordplus);
    }

    #[tokio::test]
    async fn test_add_locates_destination() {
        let mut service = service(backend());

        let record = service
            .add(NewExchange::new("Oulu, Finland", "Praktik", "Gymnasiet", Category::Atlas))
            .await
            .unwrap();
        assert_eq!(record.id, 1);
        assert!(service.store().get_coordinate("Oulu, Finland").is_some());

        // Known destination, no second lookup
        service
            .add(NewExchange::new("Oulu, Finland", "Studiebesök", "Gymnasiet", Category::Atlas))
            .await
            .unwrap();
        assert_eq!(service.resolver().backend().call_count(), 1);
    }

    #[tokio::test]
    async fn test_custom_manual_table() {
        let manual = ManualTable::new().with_entry("Atlantis, Okänt", Coordinates::new(31.0, -24.0));
        let mut service = service(MockGeocoder::new()).with_manual_table(manual);

        service
            .add(NewExchange::new("Atlantis, Okänt", "Praktik", "Gymnasiet", Category::Atlas))
            .await
            .unwrap();
        assert_eq!(
            service.store().get_coordinate("Atlantis, Okänt"),
            Some(Coordinates::new(31.0, -24.0))
        );
        assert_eq!(service.resolver().backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_add_invalid_is_rejected() {
        let mut service = service(backend());
        let err = service
            .add(NewExchange::new("Oulu, Finland", "", "Gymnasiet", Category::Atlas))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(service.store().is_empty());
        assert_eq!(service.resolver().backend().call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let mut service = service(backend());
        let record = service
            .add(NewExchange::new("Porto, Portugal", "Praktik", "Gymnasiet", Category::Erasmus))
            .await
            .unwrap();

        let updated = service
            .update(
                record.id,
                NewExchange::new("Oulu, Finland", "Praktik", "Gymnasiet", Category::Erasmus),
            )
            .await
            .unwrap();
        assert_eq!(updated.destination, "Oulu, Finland");
        assert!(service.store().get_coordinate("Oulu, Finland").is_some());

        let missing = service
            .update(99, NewExchange::new("A", "B", "C", Category::Atlas))
            .await
            .unwrap_err();
        assert!(matches!(missing, Error::NotFound(_)));

        service.delete(record.id).unwrap();
        assert!(service.store().is_empty());
        assert!(matches!(service.delete(record.id), Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_import_appends_and_resolves_new_destinations() {
        let mut service = service(backend());
        service
            .add(NewExchange::new("Porto, Portugal", "Praktik", "Gymnasiet", Category::Erasmus))
            .await
            .unwrap();

        let input = "\
Destination;Aktivitet;Kurs/besökande skola;Enhet;
Oulu, Finland;Praktik;;Gymnasiet;Atlas
Oulu, Finland;Studiebesök;;Gymnasiet;Atlas
Atlantis, Okänt;Praktik;;Gymnasiet;Erasmus
Bergen, Norge;;;Gymnasiet;Nordplus
";
        let report = service.import_csv(input.as_bytes()).await.unwrap();

        // Bergen has no activity and is still imported
        assert_eq!(report.imported, 4);
        assert!(report.rejected.is_empty());
        assert_eq!(report.resolved, 3);
        assert_eq!(report.unlocated, 1);
        assert_eq!(service.store().len(), 5);
        let ids: Vec<u64> = service.store().exchanges().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(service.store().exchanges()[4].activity, "");
        assert!(service.store().get_coordinate("Bergen, Norge").is_some());
        assert_eq!(service.resolver().backend().call_count(), 2);
    }

    #[tokio::test]
    async fn test_staged_import_resolves_without_the_service() {
        let mut service = service(backend());
        let input = "\
Destination;Aktivitet;Kurs/besökande skola;Enhet;
Oulu, Finland;Praktik;;;Atlas
Porto, Portugal;;;Gymnasiet;Erasmus
";
        let pending = service.stage_import(input.as_bytes()).unwrap();
        assert_eq!(service.store().len(), 2);
        assert_eq!(pending.destinations(), ["Oulu, Finland", "Porto, Portugal"]);
        assert_eq!(service.resolver().backend().call_count(), 0);

        let lookup = service.lookup();
        let results = lookup.resolve_each(pending.destinations().to_vec()).await;
        assert_eq!(service.resolver().backend().call_count(), 1);

        let report = service.finish_import(pending, results);
        assert_eq!(report.imported, 2);
        assert_eq!(report.resolved, 2);
        assert_eq!(report.unlocated, 0);
        assert!(service.store().get_coordinate("Porto, Portugal").is_some());
        assert_eq!(service.markers(&FilterState::default()).len(), 2);
    }

    #[tokio::test]
    async fn test_export_and_clear() {
        let mut service = service(backend());
        service
            .add(NewExchange::new("Porto, Portugal", "Praktik", "Gymnasiet", Category::Erasmus))
            .await
            .unwrap();

        let csv = service.export_csv().unwrap();
        assert!(csv.contains("Porto, Portugal;Praktik;;Gymnasiet;Erasmus"));

        service.clear();
        assert!(service.store().is_empty());
        assert!(service.store().coordinates().is_empty());
        assert_eq!(service.export_csv().unwrap().lines().count(), 1);
    }

    #[tokio::test]
    async fn test_changes_are_persisted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");
        let persist = JsonFileStore::load_from(path.clone()).unwrap();
        let mut service = ExchangeService::new(backend(), Box::new(persist))
            .with_interval(Duration::ZERO);
        service
            .add(NewExchange::new("Porto, Portugal", "Praktik", "Gymnasiet", Category::Erasmus))
            .await
            .unwrap();

        let reopened = JsonFileStore::load_from(path).unwrap();
        let mut store = ExchangeStore::new(Arc::new(CoordinateCache::new()));
        assert!(store.load(&reopened).unwrap());
        assert_eq!(store.len(), 1);
        assert!(store.get_coordinate("Porto, Portugal").is_some());
    }

    #[tokio::test]
    async fn test_stats_follow_filter() {
        let dir = TempDir::new().unwrap();
        let mut service = service(backend()).with_csv_path(write_sample(&dir));
        service.initialize().await.unwrap();

        let all = service.stats(&FilterState::all());
        assert_eq!(all.total, 5);
        assert_eq!(all.countries, 4);

        let erasmus = service.stats(&FilterState::default().with_categories([Category::Erasmus]));
        assert_eq!(erasmus.total, 2);
    }
}
