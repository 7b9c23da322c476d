//! API trait for capability registration.
//!
//! APIs are registries that plugins expose to the rest of the application.
//! The pass injector is the canonical example: the injector plugin inserts
//! it during `build()`, and pipeline drivers or lifecycle glue look it up by
//! type instead of reaching for a global singleton.
//!
//! # API vs Global Resource
//!
//! | Aspect | API | Global resource |
//! |--------|-----|-----------------|
//! | **Purpose** | Shared capability (registries) | Read-only configuration |
//! | **Access method** | `server.api::<A>()` | `server.get_global::<R>()` |
//! | **Mutation** | Interior mutability | None after insertion |
//!
//! # Interior Mutability Pattern
//!
//! APIs that need registration use interior mutability so that callers only
//! need `&A`:
//!
//! ```ignore
//! pub struct MyAPI {
//!     data: Mutex<HashMap<String, Value>>,
//! }
//!
//! impl API for MyAPI {}
//!
//! impl MyAPI {
//!     pub fn register(&self, key: &str, value: Value) {
//!         self.data.lock().insert(key.into(), value);
//!     }
//! }
//! ```

/// Marker trait for capability APIs.
///
/// # Implementing API
///
/// ```
/// use fakepass_system::api::API;
///
/// pub struct PassCounterAPI;
///
/// impl API for PassCounterAPI {}
/// ```
///
/// # Usage in Plugins
///
/// ```ignore
/// impl Plugin for InjectorPlugin {
///     fn build(&self, server: &mut Server) {
///         server.insert_api(Injector::new());
///     }
/// }
///
/// let injector = server.api::<Injector<Hdrp>>()
///     .expect("InjectorPlugin required");
/// ```
pub trait API: Send + Sync + 'static {}
