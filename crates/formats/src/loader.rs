use std::path::Path;

use tracing::info;

use crate::config::DatasetConfig;
use crate::country::CountryCollection;
use crate::geojson::DatasetError;

/// Decodes a bundled country dataset once at startup.
///
/// Failures are returned to the caller as-is; there is no retry here.
pub fn load_countries(
    path: impl AsRef<Path>,
    opts: &DatasetConfig,
) -> Result<CountryCollection, DatasetError> {
    load_countries_with_fingerprint(path, opts).map(|(countries, _)| countries)
}

/// Like [`load_countries`], also returning the blake3 hex digest of the file
/// so callers can tell whether cached geometry is stale.
pub fn load_countries_with_fingerprint(
    path: impl AsRef<Path>,
    opts: &DatasetConfig,
) -> Result<(CountryCollection, String), DatasetError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fingerprint = dataset_fingerprint(&bytes);
    let countries = CountryCollection::from_reader(bytes.as_slice(), opts)?;
    info!(
        path = %path.display(),
        countries = countries.len(),
        %fingerprint,
        "loaded country dataset"
    );
    Ok((countries, fingerprint))
}

pub fn dataset_fingerprint(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::{dataset_fingerprint, load_countries, load_countries_with_fingerprint};
    use crate::config::DatasetConfig;
    use crate::geojson::DatasetError;

    #[test]
    fn loads_sample_assets() {
        let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("assets/countries_sample.geojson");
        let countries = load_countries(path, &DatasetConfig::default()).expect("load");
        assert_eq!(countries.len(), 5);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_countries("/definitely/not/here.geojson", &DatasetConfig::default())
            .unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(err.to_string().contains("not/here.geojson"));
    }

    #[test]
    fn fingerprint_tracks_file_contents() {
        let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("assets/countries_sample.geojson");
        let (_, fingerprint) =
            load_countries_with_fingerprint(&path, &DatasetConfig::default()).expect("load");
        assert_eq!(fingerprint.len(), 64);
        let bytes = std::fs::read(&path).expect("read");
        assert_eq!(fingerprint, dataset_fingerprint(&bytes));
        assert_ne!(fingerprint, dataset_fingerprint(b"{}"));
    }
}
