//! Proc-macro crate for `graphwire`'s `#[derive(Describe)]`.
//!
//! Use the `graphwire` crate directly instead of depending on this one.

mod describe;

use darling::FromDeriveInput;

#[proc_macro_derive(Describe, attributes(graphwire))]
/// Derives [`Describe`](https://docs.rs/graphwire) for a named struct by
/// inspecting each field's Rust type and emitting the matching field
/// serializer (spec §4.2).
///
/// # Example
///
/// ```ignore
/// use graphwire_derive::Describe;
///
/// #[derive(Describe, Default)]
/// struct Person {
///     #[graphwire(id = 1)]
///     name: String,
///     #[graphwire(id = 2)]
///     age: i32,
///     #[graphwire(id = 3)]
///     phones: Vec<String>,
/// }
/// ```
///
/// # Field attributes
///
/// - `#[graphwire(id = N)]` — an identified field with tag `N` (required
///   unless `positional` is set).
/// - `#[graphwire(positional)]` — a positional field (spec's identifier-zero
///   kind), serialized before any identified field in declaration order.
///   The usual use is embedding a base type: `base: BaseStruct`.
/// - `#[graphwire(shared)]` — on an `Rc<RefCell<T>>` field, selects the
///   aliasable pointer kind instead of the default unique-ownership one.
/// - `#[graphwire(period = "millis")]` — on a `std::time::Duration` field,
///   selects the tick period (`nanos`, `micros`, `millis`, or `seconds`;
///   default `nanos`).
///
/// # Container attributes
///
/// - `#[graphwire(name = "...")]` overrides the descriptor's name (defaults
///   to the type's own identifier).
/// - `#[graphwire(post_read_hook = "method_name")]` registers an existing
///   `fn(&mut Self)` inherent method as the descriptor's post-read hook
///   (spec §4.2 item 13).
///
/// Enums, getter/setter-backed fields, and pointer-graph compatibility with
/// nested generics beyond a type's own `Describe` bound are not inferred by
/// this macro; implement [`Describe`](https://docs.rs/graphwire) by hand for
/// those, the way `EnumAsI32` is meant to be used.
pub fn describe_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
	let derive_input = syn::parse_macro_input!(input as syn::DeriveInput);

	match FromDeriveInput::from_derive_input(&derive_input).map(describe::describe_impl) {
		Err(e) => e.write_errors().into(),
		Ok(Ok(tokens)) => tokens.into(),
		Ok(Err(e)) => e.into_compile_error().into(),
	}
}
