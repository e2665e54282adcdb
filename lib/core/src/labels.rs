//! Cluster labels
//!
//! Maps `(scheme, cluster id)` to the human-readable description shown on
//! the dashboard. Tables are configuration data: built once at startup,
//! shared read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{Error, Result};
use crate::record::{ClusterId, SchemeId};

/// Labels for one scheme, keyed by cluster id
pub type LabelTable = BTreeMap<ClusterId, String>;

/// Per-scheme label tables with a fallback for unregistered schemes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelTables {
    #[serde(default = "default_fallback")]
    fallback: LabelTable,
    #[serde(default)]
    schemes: HashMap<u32, LabelTable>,
}

fn default_fallback() -> LabelTable {
    table(&["Tertinggal", "Menengah", "Maju"])
}

fn table(labels: &[&str]) -> LabelTable {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| (i as ClusterId, label.to_string()))
        .collect()
}

impl Default for LabelTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LabelTables {
    /// Tables with no scheme entries, only the fallback
    pub fn empty() -> Self {
        Self {
            fallback: default_fallback(),
            schemes: HashMap::new(),
        }
    }

    /// The label tables for SDG 1-17
    pub fn builtin() -> Self {
        let mut tables = Self::empty();
        for (scheme, labels) in BUILTIN_LABELS {
            tables.schemes.insert(*scheme, table(labels));
        }
        tables
    }

    /// Parse tables from JSON:
    ///
    /// ```json
    /// {"fallback": {"0": "low"}, "schemes": {"1": {"0": "...", "1": "..."}}}
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let tables: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidLabels(e.to_string()))?;
        if tables.schemes.contains_key(&0) {
            return Err(Error::InvalidLabels("scheme 0 is not a valid scheme".to_string()));
        }
        Ok(tables)
    }

    /// Load tables from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Overlay `other` on top of these tables. Schemes present in `other`
    /// replace ours wholesale, as does its fallback.
    pub fn merge(mut self, other: LabelTables) -> Self {
        self.fallback = other.fallback;
        self.schemes.extend(other.schemes);
        self
    }

    /// Table used for a scheme: its own, or the fallback
    pub fn table_for(&self, scheme: SchemeId) -> &LabelTable {
        self.schemes.get(&scheme.get()).unwrap_or(&self.fallback)
    }

    /// Whether the scheme has its own table
    pub fn has_scheme(&self, scheme: SchemeId) -> bool {
        self.schemes.contains_key(&scheme.get())
    }

    /// Resolve a cluster id to its label. Cluster ids the table never named
    /// resolve to `None`.
    pub fn resolve(&self, scheme: SchemeId, cluster: ClusterId) -> Option<&str> {
        self.table_for(scheme).get(&cluster).map(String::as_str)
    }

    pub fn fallback(&self) -> &LabelTable {
        &self.fallback
    }

    /// Number of schemes with their own table
    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

const BUILTIN_LABELS: &[(u32, &[&str])] = &[
    (1, &[
        "Desa Prioritas Penanganan Kemiskinan",
        "Desa dengan Kemiskinan Terdata Rendah",
    ]),
    (2, &[
        "Tidak ada kerawanan pangan, pertanian tidak rusak, tetapi kegiatan penguatan seperti pupuk organik belum berjalan. Infrastruktur akses lancar sepanjang tahun.",
        "Kondisi pangan aman, tetapi akses produksi pertanian masih bergantung pada cuaca (rawan hujan deras).",
        "Aman pangan, ada inisiatif penggunaan pupuk organik oleh sebagian warga.",
    ]),
    (3, &[
        "Desa sudah memiliki akses program kesehatan dasar seperti ibu hamil dan balita, namun jumlah kader dan dukungan lapangan masih minim, sehingga layanan belum optimal.",
        "Desa memiliki aktivitas posyandu dan kader yang cukup aktif, dengan program kesehatan berjalan baik meskipun belum ada fasilitas rawat inap atau puskesmas besar.",
    ]),
    (4, &["Akses Pendidikan Rendah", "Cukup", "Tinggi"]),
    (5, &["Desa Kader KB Standar", "Desa Kader KB Unggul"]),
    (6, &[
        "Jumlah Lembaga Air Banyak, Limbah ke Tanah",
        "Jumlah Lembaga Air Sedikit, Limbah Bervariasi",
    ]),
    (7, &["Desa Mayoritas Berlistrik", "Desa Sepenuhnya Berlistrik"]),
    (8, &["Desa Industri Mikro Rendah", "Desa Industri Mikro Tinggi"]),
    (9, &[
        "Kesenjangan Digital",
        "Desa Infrastruktur Terbaik",
        "Desa Akses Jalan Terbatas",
    ]),
    (10, &["Ketimpangan Tinggi", "Sedang", "Inklusif"]),
    (11, &[
        "Desa Bebas Kumuh & Kesiapsiagaan Rendah",
        "Desa Rentan & Belum Berkelanjutan",
        "Desa Tangguh & Permukiman Sehat",
    ]),
    (12, &[
        "Desa Mandiri Daur Ulang Dasar",
        "Desa Partisipatif Minim Fasilitas",
        "Desa Fasilitas Ada tapi Tidak Aktif",
        "Desa Kesadaran Rendah tapi Ada Partisipasi Pemilahan Sampah",
    ]),
    (13, &[
        "Desa Pasif terhadap perubahan iklim namun memiliki sistem peringatan bencana.",
        "Desa Pasif terhadap perubahan iklim dan tidak memiliki sistem peringatan bencana.",
    ]),
    (14, &["Desa Non-Pesisir", "Desa Pesisir dan ada pemanfaatan potensi laut"]),
    (15, &[
        "Desa jauh dari hutan dan minim aktivitas konservasi; masyarakat belum terlibat dalam pelestarian lingkungan.",
        "Desa di luar hutan tapi memiliki kesadaran lingkungan dengan kegiatan penanaman pohon (walau risiko kebakaran rendah).",
        "Desa dekat kawasan hutan namun belum aktif berpartisipasi dalam upaya pelestarian hutan.",
        "Desa di tepi hutan dengan keterlibatan aktif masyarakat dalam kegiatan penghijauan dan pelestarian.",
    ]),
    (16, &["Desa Adat Kuat & Aman", "Desa Aman Partisipatif"]),
    (17, &["Desa Mandiri Non-Kolaboratif", "Desa Kolaboratif Dasar"]),
];
