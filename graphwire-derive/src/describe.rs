use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, GenericArgument, PathArguments, Type};

#[derive(darling::FromDeriveInput)]
#[darling(attributes(graphwire), supports(struct_named))]
pub(crate) struct DescribeInput {
	ident: syn::Ident,
	data: darling::ast::Data<darling::util::Ignored, DescribeField>,
	generics: syn::Generics,

	name: Option<String>,
	post_read_hook: Option<syn::Ident>,
}

#[derive(darling::FromField)]
#[darling(attributes(graphwire))]
pub(crate) struct DescribeField {
	ident: Option<syn::Ident>,
	ty: syn::Type,

	id: Option<u32>,
	positional: darling::util::Flag,
	shared: darling::util::Flag,
	period: Option<syn::Ident>,
}

pub(crate) fn describe_impl(input: DescribeInput) -> Result<TokenStream, Error> {
	let type_ident = &input.ident;
	let name = input.name.clone().unwrap_or_else(|| type_ident.to_string());

	let fields = match input.data {
		darling::ast::Data::Struct(fields) => fields.fields,
		darling::ast::Data::Enum(_) => {
			return Err(Error::new_spanned(
				type_ident,
				"#[derive(Describe)] only supports named structs; implement `Describe` by hand for enums",
			));
		}
	};

	let mut positional_entries = Vec::new();
	let mut identified_entries = Vec::new();
	for field in &fields {
		let ident = field.ident.as_ref().ok_or_else(|| {
			Error::new_spanned(type_ident, "#[derive(Describe)] requires named fields")
		})?;
		let field_name = ident.to_string();
		let period = field.period.as_ref().map(|p| p.to_string()).unwrap_or_else(|| "nanos".to_owned());
		let serializer = serializer_expr(&field.ty, field.shared.is_present(), &period)?;

		let get: syn::ExprClosure = syn::parse_quote! { |s: &Self| &s.#ident };
		let get_mut: syn::ExprClosure = syn::parse_quote! { |s: &mut Self| &mut s.#ident };

		if field.positional.is_present() {
			if field.id.is_some() {
				return Err(Error::new_spanned(ident, "a positional field cannot also carry an `id`"));
			}
			positional_entries.push(quote! {
				.positional(Box::new(graphwire::descriptor::Field::positional(
					#field_name, #get, #get_mut, #serializer,
				)))
			});
		} else {
			let id = field.id.ok_or_else(|| {
				Error::new_spanned(ident, "every non-positional field needs #[graphwire(id = N)]")
			})?;
			identified_entries.push(quote! {
				.identified(Box::new(graphwire::descriptor::Field::identified(
					#id, #field_name, #get, #get_mut, #serializer,
				)))
			});
		}
	}

	let post_read_hook = input.post_read_hook.as_ref().map(|hook| {
		quote! { .post_read_hook(Self::#hook) }
	});

	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	Ok(quote! {
		impl #impl_generics graphwire::Describe for #type_ident #ty_generics #where_clause {
			fn describe() -> graphwire::descriptor::Descriptor<Self> {
				graphwire::descriptor::DescriptorBuilder::new(#name)
					#(#positional_entries)*
					#(#identified_entries)*
					#post_read_hook
					.build()
			}
		}
	})
}

/// Matches `path`'s last segment against `ident`, the lightweight
/// by-name recognition this macro uses in place of real type resolution
/// (proc-macros never see resolved types, only the tokens as written).
fn path_ident(ty: &Type) -> Option<&syn::Ident> {
	match ty {
		Type::Path(p) => p.path.segments.last().map(|s| &s.ident),
		_ => None,
	}
}

fn generic_arg(ty: &Type, index: usize) -> Result<&Type, Error> {
	let Type::Path(p) = ty else {
		return Err(Error::new_spanned(ty, "expected a generic type here"));
	};
	let seg = p.path.segments.last().expect("non-empty path");
	let PathArguments::AngleBracketed(args) = &seg.arguments else {
		return Err(Error::new_spanned(ty, "expected angle-bracketed generic arguments"));
	};
	args.args
		.iter()
		.filter_map(|a| match a {
			GenericArgument::Type(t) => Some(t),
			_ => None,
		})
		.nth(index)
		.ok_or_else(|| Error::new_spanned(ty, "missing expected generic type argument"))
}

fn is_u8(ty: &Type) -> bool {
	path_ident(ty).map(|i| i == "u8").unwrap_or(false)
}

/// Unwraps `RefCell<T>` to `T`, the shape every `Rc`/`Weak` reference field
/// in this crate's pointer model carries (spec `SPEC_FULL.md` §13).
fn refcell_inner(ty: &Type) -> Result<&Type, Error> {
	match path_ident(ty) {
		Some(i) if i == "RefCell" => generic_arg(ty, 0),
		_ => Err(Error::new_spanned(ty, "Rc/Weak reference fields must wrap a RefCell<T>")),
	}
}

fn period_type(period: &str, span: &Type) -> Result<TokenStream, Error> {
	Ok(match period {
		"nanos" => quote! { graphwire::descriptor::container::Nanoseconds },
		"micros" => quote! { graphwire::descriptor::container::Microseconds },
		"millis" => quote! { graphwire::descriptor::container::Milliseconds },
		"seconds" => quote! { graphwire::descriptor::container::Seconds },
		other => {
			return Err(Error::new_spanned(
				span,
				format!("unknown duration period `{other}`; expected nanos, micros, millis, or seconds"),
			));
		}
	})
}

/// Builds the `FieldSerializer` expression for `ty`, recursing into
/// container element/key/value types. Leaf types not recognized here are
/// assumed to implement `Describe` themselves (spec §4.2 items 11/14: a
/// nested composite or an embedded base, identical on the wire).
fn serializer_expr(ty: &Type, shared: bool, period: &str) -> Result<TokenStream, Error> {
	if let Type::Array(arr) = ty {
		let elem = serializer_expr(&arr.elem, false, period)?;
		return Ok(quote! { graphwire::descriptor::container::FixedArrayField::new(#elem) });
	}

	let Some(ident) = path_ident(ty) else {
		return Ok(quote! { <#ty as graphwire::Describe>::describe() });
	};

	Ok(match ident.to_string().as_str() {
		"bool" | "f32" | "f64" | "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" => {
			quote! { graphwire::descriptor::primitive::Primitive }
		}
		"String" => quote! { graphwire::descriptor::container::Utf8StringField },
		"Duration" => {
			let period_ty = period_type(period, ty)?;
			quote! { graphwire::descriptor::container::DurationField::<#period_ty>::new() }
		}
		"Vec" => {
			let elem_ty = generic_arg(ty, 0)?;
			if is_u8(elem_ty) {
				quote! { graphwire::descriptor::container::BytesField }
			} else {
				let elem = serializer_expr(elem_ty, false, period)?;
				quote! { graphwire::descriptor::container::VecField::new(#elem) }
			}
		}
		"BTreeMap" => {
			let key = serializer_expr(generic_arg(ty, 0)?, false, period)?;
			let value = serializer_expr(generic_arg(ty, 1)?, false, period)?;
			quote! { graphwire::descriptor::container::BTreeMapField::new(#key, #value) }
		}
		"HashMap" => {
			let key = serializer_expr(generic_arg(ty, 0)?, false, period)?;
			let value = serializer_expr(generic_arg(ty, 1)?, false, period)?;
			quote! { graphwire::descriptor::container::HashMapField::new(#key, #value) }
		}
		"Rc" => {
			let inner = refcell_inner(generic_arg(ty, 0)?)?;
			if shared {
				quote! { graphwire::descriptor::pointer::Shared::<#inner>::new() }
			} else {
				quote! { graphwire::descriptor::pointer::Owning::<#inner>::new() }
			}
		}
		"Weak" => {
			let inner = refcell_inner(generic_arg(ty, 0)?)?;
			quote! { graphwire::descriptor::pointer::Raw::<#inner>::new() }
		}
		_ => quote! { <#ty as graphwire::Describe>::describe() },
	})
}
