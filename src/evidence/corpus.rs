//! Seed reference corpus for MVP grounding.
//!
//! A handful of curated entries keyed by lowercase keywords. Later retrieval
//! backends replace this through the `EvidenceSource` trait.

/// One curated reference entry.
#[derive(Debug, Clone, Copy)]
pub struct SeedReference {
    /// Lowercase keywords matched as substrings of the claim text.
    pub keywords: &'static [&'static str],
    pub title: &'static str,
    pub url: &'static str,
    pub snippet: &'static str,
}

/// The seed corpus shipped with the runtime.
pub const SEED_REFERENCES: &[SeedReference] = &[
    SeedReference {
        keywords: &["apollo", "1969", "moon", "landed", "armstrong", "aldrin"],
        title: "NASA Apollo 11 Mission Overview",
        url: "https://www.nasa.gov/mission/apollo-11/",
        snippet: "Apollo 11 landed on the Moon in July 1969. Neil Armstrong and Buzz Aldrin \
                  walked on the lunar surface.",
    },
    SeedReference {
        keywords: &["moon", "composition", "rock", "regolith", "geology"],
        title: "NASA - Moon Facts / Overview",
        url: "https://science.nasa.gov/moon/",
        snippet: "The Moon is a rocky body with a surface covered by regolith and impact \
                  craters; it is not composed of candy.",
    },
    SeedReference {
        keywords: &["candy", "made of candy", "moon is made of candy"],
        title: "Scientific Consensus (General): The Moon is rock, not candy",
        url: "https://science.nasa.gov/moon/",
        snippet: "Widely established: the Moon is primarily silicate rock and metal; 'made \
                  of candy' is not supported.",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_keywords_are_lowercase() {
        for entry in SEED_REFERENCES {
            for kw in entry.keywords {
                assert_eq!(*kw, kw.to_lowercase(), "keyword {kw:?} in {}", entry.title);
            }
        }
    }

    #[test]
    fn test_corpus_urls_parse() {
        for entry in SEED_REFERENCES {
            url::Url::parse(entry.url).expect("seed reference url is valid");
        }
    }
}
