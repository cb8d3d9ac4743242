//! Standalone LaTeX document wrapper.

/// Wrap a quantikz environment in a compilable `standalone` document.
pub fn standalone(body: &str, border: &str) -> String {
    format!(
        "\\documentclass[tikz,border={border}]{{standalone}}\n\
         \\usepackage{{tikz}}\n\
         \\usetikzlibrary{{quantikz2}}\n\
         \n\
         \\begin{{document}}\n\
         {body}\n\
         \\end{{document}}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preamble() {
        let doc = standalone("BODY", "5pt");
        assert!(doc.starts_with("\\documentclass[tikz,border=5pt]{standalone}\n"));
        assert!(doc.contains("\\usetikzlibrary{quantikz2}\n\n\\begin{document}\nBODY\n"));
        assert!(doc.ends_with("\\end{document}\n"));
    }
}
