use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, spanned::Spanned, FnArg, Ident, ItemFn, Pat, Signature, Type};

/// Transform an asynchronous test into a synchronous one, inject dependencies,
/// and ensure that the data directory is removed regardless of how the test
/// terminates.
///
/// Every test gets a fresh data directory seeded with the example roster.
/// Injectable dependencies are [`rocket::local::asynchronous::Client`] and
/// the server's [`crate::model::BallotBox`]. Pass `admin` to log the client
/// in as the administrator first.
#[proc_macro_attribute]
pub fn backend_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut item_fn = parse_macro_input!(input as ItemFn);

    // Extract the arguments to inject and reject invalid function signatures.
    let test_args = match check_sig(item_fn.sig.clone()) {
        Ok(args) => args,
        Err(err) => {
            return err.into_compile_error().into();
        }
    };

    // Rename the future so the test can have its original name.
    let name = item_fn.sig.ident.clone();
    let new_name = format_ident!("{}_fut", name);
    item_fn.sig.ident = new_name.clone();

    // Log in the client as admin if needed.
    let maybe_login = match parse_macro_input!(args as Option<Ident>) {
        Some(arg) if arg == "admin" => quote! {
            // The response borrows the client, so it must not outlive this block.
            {
                let response = rocket_client
                    .post("/api/admin/login")
                    .header(rocket::http::ContentType::JSON)
                    .body(rocket::serde::json::json!(crate::api::AdminCredentials::example()).to_string())
                    .dispatch()
                    .await;
                assert_eq!(rocket::http::Status::Ok, response.status(), "admin login failed");
            }
        },
        Some(arg) => {
            return syn::Error::new(arg.span(), "Expected `admin` or nothing")
                .into_compile_error()
                .into();
        }
        None => quote! {},
    };

    // Rewrite the test function.
    quote! {
        #[test]
        fn #name() {
            /// Test setup.
            async fn setup(data_dir: &std::path::Path) -> rocket::local::asynchronous::Client {
                let rocket_client = rocket::local::asynchronous::Client::tracked(crate::rocket_for_data_dir(data_dir))
                    .await
                    .unwrap();

                #maybe_login

                rocket_client
            }

            /// The test itself.
            #item_fn

            log4rs_test_utils::test_logging::init_logging_once_for(
                ["rankvote_backend"],
                None,
                None,
            );

            let data_dir = crate::example_data_dir();
            let runtime = rocket::tokio::runtime::Builder::new_multi_thread()
                .thread_name("rocket-worker-test-thread")
                .worker_threads(1)
                .enable_all()
                .build()
                .unwrap();

            // Run the setup.
            let rocket_client = runtime.block_on(setup(data_dir.path()));
            #[allow(unused_variables)]
            let ballot_box = rocket_client
                .rocket()
                .state::<crate::model::BallotBox>()
                .expect("ballot box is managed")
                .clone();

            // Run the test, catching any panics.
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                runtime.block_on(#new_name(#(#test_args),*));
            }));

            // Run the cleanup.
            drop(runtime);
            data_dir.close().unwrap();

            // If the test panicked, re-raise the panic.
            if let Err(cause) = result {
                std::panic::resume_unwind(cause);
            }
        }
    }
    .into()
}

/// Ensure the wrapped test is async, extract parameters to inject, and reject unknown parameters.
fn check_sig(sig: Signature) -> Result<Vec<TokenStream2>, syn::Error> {
    if sig.asyncness.is_none() {
        return Err(syn::Error::new(sig.span(), "Test must be marked `async`"));
    }

    let mut has_client = false;
    let mut has_ballot_box = false;
    let mut args = vec![];

    for input in &sig.inputs {
        if let FnArg::Typed(pat_type) = input {
            if let Pat::Ident(_) = &*pat_type.pat {
                if let Type::Path(type_path) = &*pat_type.ty {
                    if let Some(type_ident) = type_path.path.get_ident() {
                        if type_ident == "Client" {
                            if has_client {
                                return Err(syn::Error::new(input.span(), "Test cannot accept more than one `rocket::local::asynchronous::Client`"));
                            }
                            has_client = true;
                            args.push(quote! { rocket_client });
                            continue;
                        } else if type_ident == "BallotBox" {
                            if has_ballot_box {
                                return Err(syn::Error::new(
                                    input.span(),
                                    "Test cannot accept more than one `BallotBox`",
                                ));
                            }
                            has_ballot_box = true;
                            args.push(quote! { ballot_box });
                            continue;
                        }
                    }
                }
            }
        }

        return Err(syn::Error::new(
            input.span(),
            "Expected one of `client_ident: Client` or `ballot_box_ident: BallotBox`",
        ));
    }

    Ok(args)
}
