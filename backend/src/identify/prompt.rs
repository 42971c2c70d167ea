//! Instruction text sent to the model. Every builder here is pure and
//! deterministic; the image travels separately as its own part.

const DEFAULT_IDENTIFICATION_INSTRUCTIONS: &str = "\
Analisis gambar tumbuhan ini dan identifikasi spesiesnya. \
Jika gambar tidak menunjukkan tumbuhan yang jelas, set confidence di bawah 50 \
dan jelaskan alasannya di description.";

const IDENTIFICATION_SCHEMA: &str = r#"{
  "name": "nama umum tumbuhan dalam bahasa Indonesia",
  "scientificName": "nama ilmiah tumbuhan",
  "confidence": 0,
  "description": "deskripsi singkat tentang tumbuhan ini",
  "characteristics": ["karakteristik1", "karakteristik2", "karakteristik3"],
  "family": "famili tumbuhan",
  "habitat": "habitat alami tumbuhan",
  "origin": "daerah atau negara asal tumbuhan",
  "endemicStatus": "Tanaman endemik atau Bukan tanaman endemik",
  "distribution": "sebaran geografis tumbuhan",
  "uses": ["kegunaan1", "kegunaan2"],
  "careInstructions": "instruksi perawatan singkat",
  "isEdible": false,
  "isDecorative": false,
  "conservationStatus": "status konservasi IUCN jika diketahui"
}"#;

const CARE_TIPS_SCHEMA: &str = r#"{
  "watering": "panduan penyiraman",
  "sunlight": "kebutuhan cahaya matahari",
  "soil": "jenis tanah yang cocok",
  "temperature": "suhu optimal",
  "humidity": "kelembapan yang dibutuhkan",
  "fertilizer": "panduan pemupukan",
  "pruning": "panduan pemangkasan",
  "commonProblems": ["masalah1", "masalah2"],
  "tips": ["tip1", "tip2", "tip3"],
  "seasonalCare": "perawatan musim hujan dan kemarau",
  "propagation": "cara perbanyakan"
}"#;

const JSON_ONLY_RULES: &str = "\
PENTING: Berikan HANYA JSON yang valid tanpa markdown, tanpa backticks, \
tanpa kata \"json\", dan tanpa teks tambahan. \
Respon harus dimulai langsung dengan { dan diakhiri dengan }.";

/// Builds the identification prompt. A caller-supplied template replaces the
/// lead-in instructions; the schema and output rules are always appended.
pub fn identification_prompt(template: Option<&str>) -> String {
    let instructions = template
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_IDENTIFICATION_INSTRUCTIONS);

    format!(
        "{}\n\nBerikan informasi dalam format JSON berikut:\n{}\n\n\
         Angka confidence adalah bilangan bulat 0 sampai 100. \
         isEdible dan isDecorative bernilai true atau false.\n\n{}",
        instructions, IDENTIFICATION_SCHEMA, JSON_ONLY_RULES
    )
}

pub fn care_tips_prompt(plant_name: &str) -> String {
    format!(
        "Berikan tips perawatan detail untuk tumbuhan \"{}\".\n\n\
         Berikan informasi dalam format JSON berikut:\n{}\n\n\
         Berikan response dalam bahasa Indonesia.\n\n{}",
        plant_name.trim(),
        CARE_TIPS_SCHEMA,
        JSON_ONLY_RULES
    )
}
