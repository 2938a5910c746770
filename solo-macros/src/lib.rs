mod utils;

use proc_macro::TokenStream;

/// Builds a `Vec<solo::Callable<T>>` out of closures of different types.
///
/// Each argument must be a `FnOnce() -> Result<T, E>` with `E` convertible
/// into `solo::BoxError`. The closures are boxed and their errors
/// converted, so the vector can be handed to `invoke_all` or
/// `invoke_any`.
///
/// # Examples
///
/// ```rust,ignore
/// let fastest = executor.invoke_any(solo::tasks![
///     || Ok::<_, std::io::Error>(primary()),
///     move || fallback(&config),
/// ])?;
/// ```
#[proc_macro]
pub fn tasks(input: TokenStream) -> TokenStream {
    let args = utils::split_args(input);

    let mut output = String::new();
    output.push_str("::std::vec![\n");

    for expr_tokens in &args {
        let expr = utils::tokens_to_string(expr_tokens);
        output.push_str(&format!(
            "    ::std::boxed::Box::new({{\n\
                    let __task = {expr};\n\
                    move || __task().map_err(::std::convert::Into::<::solo::BoxError>::into)\n\
                }}) as ::solo::Callable<_>,\n"
        ));
    }

    output.push_str("]\n");

    output.parse().unwrap_or_else(|err| {
        let msg = format!("tasks macro error: {}", err);
        format!("compile_error!({:?});", msg)
            .parse()
            .expect("compile_error! invocation is valid")
    })
}
