use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat, Type};

/// Number of ticks between unconditional timing reports for tick-aware systems.
const REPORT_EVERY_TICKS: u64 = 200;

/// Time an AI system when the `perf_stats` feature is enabled.
///
/// The wrapped body runs unchanged; a guard records the elapsed wall time
/// and reports it through `bevy::log::info!` when it exceeds the threshold.
/// Systems that take a `tick: Res<SimTick>` parameter additionally report
/// every few hundred ticks so slow drifts show up in the log.
///
/// ```ignore
/// #[profile(2)]
/// pub fn run_goap_agents(tick: Res<SimTick>, /* ... */) { /* ... */ }
/// ```
///
/// Without the feature the guard is compiled out entirely.
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = attr.to_string().trim().parse().unwrap_or(1);

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let system_name = sig.ident.to_string();

    let tick_aware = sig.inputs.iter().any(is_sim_tick_param);

    let tick_field = if tick_aware {
        quote! { Some(tick.0) }
    } else {
        quote! { None }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_guard = {
                struct ProfileGuard {
                    system: &'static str,
                    started: std::time::Instant,
                    tick: Option<u64>,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.started.elapsed();
                        let periodic = self.tick.is_some_and(|t| t % #REPORT_EVERY_TICKS == 0);
                        if elapsed.as_millis() > #threshold_ms || periodic {
                            match self.tick {
                                Some(t) => bevy::prelude::info!("[PERF] tick {} {}: {:?}", t, self.system, elapsed),
                                None => bevy::prelude::info!("[PERF] {}: {:?}", self.system, elapsed),
                            }
                        }
                    }
                }
                ProfileGuard {
                    system: #system_name,
                    started: std::time::Instant::now(),
                    tick: #tick_field,
                }
            };

            #block
        }
    };

    output.into()
}

/// True for a parameter spelled `tick: Res<SimTick>` (any path prefix or lifetime).
fn is_sim_tick_param(arg: &FnArg) -> bool {
    let FnArg::Typed(pat_type) = arg else {
        return false;
    };
    let Pat::Ident(ident) = pat_type.pat.as_ref() else {
        return false;
    };
    if ident.ident != "tick" {
        return false;
    }
    match pat_type.ty.as_ref() {
        Type::Path(path) => quote!(#path).to_string().contains("SimTick"),
        _ => false,
    }
}
