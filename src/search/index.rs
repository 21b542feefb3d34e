//! Document index for knowledge-base retrieval
//!
//! Text files are split into overlapping chunks and indexed by token, so a
//! query touches only the chunks that share a word with it.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::assistant::Retriever;

/// Chunk length in characters
pub const CHUNK_SIZE: usize = 1000;
/// Characters shared by consecutive chunks
pub const CHUNK_OVERLAP: usize = 200;
/// Chunks returned per query
pub const DEFAULT_TOP_K: usize = 3;

const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// A piece of a source document
#[derive(Debug, Clone)]
pub struct Chunk {
    pub source: PathBuf,
    pub text: String,
}

/// Inverted index over document chunks
#[derive(Debug, Default, Clone)]
pub struct DocumentIndex {
    /// word (lowercased) → Set<chunk id>
    inverted_index: HashMap<String, HashSet<usize>>,

    /// chunk id → chunk
    chunks: Vec<Chunk>,

    /// Source files that contributed chunks
    sources: Vec<PathBuf>,

    top_k: usize,
}

impl DocumentIndex {
    /// Create a new empty index
    pub fn new() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            ..Default::default()
        }
    }

    /// Build an index from every supported file directly inside `dir`
    ///
    /// Creates the directory when missing. Unreadable files are skipped with
    /// a warning.
    pub fn from_dir(dir: &Path) -> std::io::Result<Self> {
        let mut index = Self::new();

        if !dir.exists() {
            fs::create_dir_all(dir)?;
            tracing::info!(dir = %dir.display(), "Created knowledge base directory");
            return Ok(index);
        }

        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| is_supported(path))
            .collect();
        paths.sort();

        for path in paths {
            match fs::read_to_string(&path) {
                Ok(content) => index.add_document(&path, &content),
                Err(e) => tracing::warn!(file = %path.display(), error = %e, "Skipping document"),
            }
        }

        if index.is_empty() {
            tracing::info!(dir = %dir.display(), "No documents found; add .txt or .md files to enable the knowledge base");
        } else {
            tracing::info!(
                files = index.sources.len(),
                chunks = index.chunks.len(),
                "Knowledge base loaded"
            );
        }

        Ok(index)
    }

    /// Number of chunks returned per query
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Split and index one document
    pub fn add_document(&mut self, source: &Path, content: &str) {
        let mut added = false;
        for text in split_chunks(content, CHUNK_SIZE, CHUNK_OVERLAP) {
            let id = self.chunks.len();
            for token in tokenize(&text) {
                self.inverted_index.entry(token).or_default().insert(id);
            }
            self.chunks.push(Chunk {
                source: source.to_path_buf(),
                text,
            });
            added = true;
        }
        if added {
            self.sources.push(source.to_path_buf());
        }
    }

    /// Chunks ranked by how many distinct query tokens they contain
    ///
    /// Ties keep document order.
    pub fn search(&self, query: &str) -> Vec<&Chunk> {
        let terms: HashSet<String> = tokenize(query).into_iter().collect();

        let mut scores: HashMap<usize, usize> = HashMap::new();
        for term in &terms {
            if let Some(ids) = self.inverted_index.get(term) {
                for &id in ids {
                    *scores.entry(id).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, usize)> = scores.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .take(self.top_k)
            .map(|(id, _)| &self.chunks[id])
            .collect()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Get index statistics
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            document_count: self.sources.len(),
            chunk_count: self.chunks.len(),
            unique_tokens: self.inverted_index.len(),
        }
    }
}

impl Retriever for DocumentIndex {
    fn query(&self, text: &str) -> String {
        self.search(text)
            .iter()
            .map(|chunk| chunk.text.trim())
            .filter(|t| !t.is_empty())
            .enumerate()
            .map(|(i, t)| format!("[Source {}]: {}", i + 1, t))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Index statistics
#[derive(Debug, Clone)]
pub struct IndexStats {
    pub document_count: usize,
    pub chunk_count: usize,
    pub unique_tokens: usize,
}

fn is_supported(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

/// Split text into windows of `size` characters, each starting
/// `size - overlap` characters after the previous one
fn split_chunks(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.iter().all(|c| c.is_whitespace()) {
        return Vec::new();
    }

    let step = size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Tokenize text into searchable tokens
/// Splits on whitespace and punctuation, lowercases
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter(|s| !s.is_empty() && s.chars().count() >= 2) // Skip very short tokens
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_index_and_query() {
        let mut index = DocumentIndex::new();
        index.add_document(Path::new("rust.txt"), "Rust guarantees memory safety without a garbage collector.");
        index.add_document(Path::new("tea.txt"), "Green tea is brewed at lower temperatures.");

        let context = index.query("How does Rust handle memory?");
        assert_eq!(
            context,
            "[Source 1]: Rust guarantees memory safety without a garbage collector."
        );

        assert_eq!(index.query("quantum chromodynamics"), "");
    }

    #[test]
    fn test_ranking_prefers_more_matches() {
        let mut index = DocumentIndex::new().with_top_k(2);
        index.add_document(Path::new("a.txt"), "tea");
        index.add_document(Path::new("b.txt"), "green tea temperature");
        index.add_document(Path::new("c.txt"), "coffee");

        let hits = index.search("green tea temperature");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, PathBuf::from("b.txt"));
        assert_eq!(hits[1].source, PathBuf::from("a.txt"));
    }

    #[test]
    fn test_split_chunks_overlap() {
        let text: String = std::iter::repeat('a').take(2000).collect();
        let chunks = split_chunks(&text, CHUNK_SIZE, CHUNK_OVERLAP);

        // Starts at 0, 800, 1600
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 1000);
        assert_eq!(chunks[1].chars().count(), 1000);
        assert_eq!(chunks[2].chars().count(), 400);

        assert!(split_chunks("   \n", CHUNK_SIZE, CHUNK_OVERLAP).is_empty());
        assert_eq!(split_chunks("short", CHUNK_SIZE, CHUNK_OVERLAP), vec!["short"]);
    }

    #[test]
    fn test_from_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "The launch window opens in March.").unwrap();
        fs::write(temp_dir.path().join("readme.md"), "Project codename is Falcon.").unwrap();
        fs::write(temp_dir.path().join("image.png"), [0u8, 1, 2]).unwrap();

        let index = DocumentIndex::from_dir(temp_dir.path()).unwrap();
        let stats = index.stats();
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.chunk_count, 2);

        assert!(index.query("what is the codename").contains("Falcon"));
    }

    #[test]
    fn test_from_missing_dir_creates_it() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("knowledge_base");

        let index = DocumentIndex::from_dir(&dir).unwrap();
        assert!(index.is_empty());
        assert!(dir.is_dir());
    }

    #[test]
    fn test_tokenize() {
        let tokens = tokenize("Hello, World! This is a TEST.");
        assert!(tokens.contains(&"hello".to_string()));
        assert!(tokens.contains(&"world".to_string()));
        assert!(tokens.contains(&"test".to_string()));
        // Short tokens filtered (len < 2)
        assert!(!tokens.contains(&"a".to_string()));
        assert!(tokens.contains(&"is".to_string()));
    }
}
