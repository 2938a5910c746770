use proc_macro::{TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Each argument is returned as a `Vec<TokenTree>`. Commas inside
/// delimited groups never reach this level. Commas inside a turbofish
/// (`Ok::<_, E>`) are not treated as separators either.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current: Vec<TokenTree> = Vec::new();
    let mut angle_depth = 0usize;

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' && angle_depth == 0 => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
                continue;
            }
            TokenTree::Punct(p) if p.as_char() == '<' => {
                if angle_depth > 0 || ends_with_path_sep(&current) {
                    angle_depth += 1;
                }
            }
            TokenTree::Punct(p) if p.as_char() == '>' && angle_depth > 0 => {
                // `->` inside a turbofish is a return type, not a closer.
                if !ends_with_punct(&current, '-') {
                    angle_depth -= 1;
                }
            }
            _ => {}
        }

        current.push(token);
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Converts a slice of tokens into Rust source.
///
/// Goes through `TokenStream`'s own printer so adjacent tokens never
/// merge (e.g. `1 as u8` or `< -`).
pub(crate) fn tokens_to_string(tokens: &[TokenTree]) -> String {
    tokens.iter().cloned().collect::<TokenStream>().to_string()
}

/// Returns `true` if the tokens end with a `::` path separator.
fn ends_with_path_sep(tokens: &[TokenTree]) -> bool {
    match tokens {
        [.., TokenTree::Punct(a), TokenTree::Punct(b)] => a.as_char() == ':' && b.as_char() == ':',
        _ => false,
    }
}

fn ends_with_punct(tokens: &[TokenTree], c: char) -> bool {
    matches!(tokens.last(), Some(TokenTree::Punct(p)) if p.as_char() == c)
}
