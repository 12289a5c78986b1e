/*
 *  NitroVote - Discord bot tracking monthly Veil votes and Nitro rewards.
 *  Copyright (C) 2025  NitroVote contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
/*
 * Procedural macros used by the bot's commands. They live in the library target because a
 * proc-macro crate cannot be part of the binary that uses it.
 */
extern crate proc_macro;
use proc_macro::TokenStream;
use quote::{quote, ToTokens as _};
use syn::{parse_macro_input, FnArg, Ident, ItemFn, Pat};

/// Finds the identifier bound by the first argument of a command, which must be its
/// `poise::Context`.
fn context_ident(function: &ItemFn) -> darling::Result<Ident> {
    let first_arg = function.sig.inputs.first().ok_or_else(|| {
        darling::Error::custom("[log_cmd] the command must take its context as first argument")
            .with_span(&function.sig)
    })?;

    let FnArg::Typed(arg) = first_arg else {
        return Err(
            darling::Error::custom("[log_cmd] commands cannot take `self`")
                .with_span(first_arg),
        );
    };

    match &*arg.pat {
        Pat::Ident(binding) => Ok(binding.ident.clone()),
        other => Err(
            darling::Error::custom("[log_cmd] the context must be bound to a plain identifier")
                .with_span(other),
        ),
    }
}

/**
 * Logs every invocation of the annotated command through `tracing`, before its body runs.
 *
 * ```ignore
 * #[poise::command(slash_command)]
 * #[nitrovote::log_cmd]
 * async fn myvotes(ctx: Context<'_>) -> Result<(), Error> { ... }
 * ```
 */
#[proc_macro_attribute]
pub fn log_cmd(_attrs: TokenStream, item: TokenStream) -> TokenStream {
    let mut function = parse_macro_input!(item as ItemFn);

    let ctx = match context_ident(&function) {
        Ok(ident) => ident,
        Err(err) => return err.write_errors().into(),
    };

    let log_stmt = quote! {
        crate::utils::log_cmd!(#ctx);
    };
    match syn::parse2::<syn::Stmt>(log_stmt) {
        Ok(stmt) => function.block.stmts.insert(0, stmt),
        Err(err) => return err.into_compile_error().into(),
    }

    function.into_token_stream().into()
}
