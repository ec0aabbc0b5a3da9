mod classify;
mod discovery;

use crate::entry::{Corpus, Entry};

pub fn entry(url: &str, title: &str) -> Entry {
    Entry {
        url: url.to_string(),
        title: title.to_string(),
        date: None,
    }
}

pub fn corpus(items: &[(&str, &str)]) -> Corpus {
    Corpus::new(items.iter().map(|(url, title)| entry(url, title)).collect())
}

/// The two-entry corpus used throughout: one paper, one recipe.
pub fn paper_and_pasta() -> Corpus {
    corpus(&[
        ("https://arxiv.org/abs/1", "Attention Is All You Need"),
        ("https://example.com", "Cooking pasta"),
    ])
}

/// A mixed bag for property-style checks.
pub fn mixed() -> Corpus {
    corpus(&[
        ("https://arxiv.org/abs/1706.03762", "Attention Is All You Need"),
        ("https://example.com", "Cooking pasta"),
        ("https://blog.rust-lang.org/2024/01/01/release.html", "Announcing a new release"),
        ("https://www.openreview.net/forum?id=abc", "Scaling laws revisited"),
        ("https://news.ycombinator.com/item?id=1", "Show HN: a tiny LLM in your browser"),
        ("https://en.wikipedia.org/wiki/Bread", "Bread"),
        ("https://github.com/pytorch/pytorch", "Tensors and dynamic neural networks"),
        ("https://example.org/gardening", "Tomatoes in small gardens"),
        ("https://arxiv.org/pdf/2401.00001v2", "Diffusion models for pasta shapes"),
        ("https://www.nytimes.com/cooking", "Weeknight dinners"),
    ])
}
