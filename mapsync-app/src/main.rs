use async_trait::async_trait;
use mapsync::{
    constants::LOAD_EVENT,
    prelude::*,
    EngineEvent, FeatureDescriptor,
};
use serde_json::json;

const CIRCLE_SOURCE: &str = "search-area";
const CIRCLE_LAYER: &str = "search-area-fill";
const IMAGES_SOURCE: &str = "images";
const IMAGES_LAYER: &str = "images-symbols";

/// Headless photo map session: mounts a view, follows camera moves, and keeps
/// the search circle and photo markers reconciled onto the engine.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mapsync::init_logging();

    let mut app = PhotoMapApp::new(MapViewProfile::default(), PhotoSearchConfig::default());
    app.view.mount(HeadlessContainer::new("map"))?;
    app.render()?;

    app.view.with_engine(|engine| engine.complete_load());
    log::info!("view is {}", app.view.state());

    let moves = [
        (LatLng::new(64.0, 10.0), 5.0, LatLngBounds::from_coords(62.0, 5.0, 66.0, 15.0)),
        (LatLng::new(59.91, 10.75), 9.0, LatLngBounds::from_coords(59.7, 10.3, 60.1, 11.2)),
        (LatLng::new(60.39, 5.32), 11.0, LatLngBounds::from_coords(60.3, 5.1, 60.5, 5.5)),
    ];

    for (center, zoom, bounds) in moves {
        app.view.with_engine(|engine| {
            engine.jump_to(center, zoom, bounds);
            engine.fire("moveend", Some(EngineEvent::new("moveend")));
        });
        app.refresh_photos().await;
        app.render()?;
    }

    app.view.with_engine(|engine| {
        engine.fire("click", Some(EngineEvent::new("click").at(LatLng::new(60.39, 5.32))));
    });

    // A re-render with nothing new must not touch the engine
    app.render()?;

    if let Some(engine) = app.view.unmount() {
        log::info!(
            "session ended: {:?}, {} listeners left, {} still waiting on '{}'",
            engine.stats(),
            engine.total_listeners(),
            engine.listener_count(LOAD_EVENT),
            LOAD_EVENT
        );
    }
    Ok(())
}

/// Camera state captured by the `onMoveEnd` handler
#[derive(Debug, Clone, Copy)]
struct Viewport {
    center: LatLng,
    bounds: LatLngBounds,
}

struct PhotoMapApp {
    view: MapView<HeadlessEngine>,
    features: FeatureManager<HeadlessEngine>,
    aggregator: PhotoAggregator,
    config: PhotoSearchConfig,
    viewport: Rc<RefCell<Option<Viewport>>>,
    searched: Option<Viewport>,
    photos: Vec<PhotoMarker>,
}

impl PhotoMapApp {
    fn new(profile: MapViewProfile, config: PhotoSearchConfig) -> Self {
        let aggregator = PhotoAggregator::new(&config)
            .with_provider(SyntheticProvider::new("geotagged", Some(32.0), 0.2))
            .with_provider(SyntheticProvider::new("street-level", None, 0.05));

        Self {
            view: MapView::new(profile.resolve()),
            features: FeatureManager::new(),
            aggregator,
            config,
            viewport: Rc::new(RefCell::new(None)),
            searched: None,
            photos: Vec::new(),
        }
    }

    fn props(&self) -> HandlerProps<HeadlessEngine> {
        let viewport = Rc::clone(&self.viewport);

        HandlerProps::<HeadlessEngine>::new()
            .on("onMoveEnd", move |args| {
                if let HandlerArgs::Event { map, .. } = args {
                    *viewport.borrow_mut() = Some(Viewport {
                        center: map.center(),
                        bounds: map.bounds(),
                    });
                }
            })
            .on("onClick", |args| {
                if let HandlerArgs::Event { event, .. } = args {
                    log::info!("map clicked at {:?}", event.lng_lat);
                }
            })
    }

    /// Queries every provider around the latest viewport
    async fn refresh_photos(&mut self) {
        let Some(viewport) = *self.viewport.borrow() else {
            return;
        };

        let query = match PhotoQuery::from_viewport(viewport.center, &viewport.bounds) {
            Ok(query) => query,
            Err(e) => {
                log::warn!("skipping photo search: {}", e);
                return;
            }
        };

        match self.aggregator.images(&query).await {
            Ok(photos) => {
                log::info!(
                    "{} photos within {:.1} km of ({:.3}, {:.3})",
                    photos.len(),
                    query.radius_km,
                    query.center.lat,
                    query.center.lng
                );
                self.photos = photos;
                self.searched = Some(viewport);
            }
            Err(e) => log::warn!("photo search failed: {}", e),
        }
    }

    fn declared(&self) -> mapsync::Result<Vec<FeatureDescriptor>> {
        let Some(viewport) = self.searched else {
            return Ok(Vec::new());
        };

        let radius_km = search_radius_km(viewport.center, &viewport.bounds);
        let circle = circle_polygon(viewport.center, radius_km, self.config.circle_steps);
        let markers = markers_feature_collection(&self.photos);

        Ok(vec![
            SourceDescriptor::geojson(CIRCLE_SOURCE, circle.to_value()?).into(),
            LayerDescriptor::new(CIRCLE_LAYER, "fill", CIRCLE_SOURCE)
                .with_paint(json!({"fill-color": "#088", "fill-opacity": 0.8}))
                .into(),
            SourceDescriptor::geojson(IMAGES_SOURCE, markers.to_value()?).into(),
            LayerDescriptor::new(IMAGES_LAYER, "symbol", IMAGES_SOURCE)
                .with_layout(json!({
                    "icon-image": "{icon}-15",
                    "text-field": "{title}",
                    "text-font": ["Open Sans Semibold", "Arial Unicode MS Bold"],
                    "text-offset": [0, 0.6],
                    "text-anchor": "top"
                }))
                .into(),
        ])
    }

    fn render(&mut self) -> anyhow::Result<()> {
        let props = self.props();
        let declared = self.declared()?;
        let features = &mut self.features;

        let mut outcomes = Ok(Vec::new());
        let report = self
            .view
            .render(&props, |context| outcomes = features.reconcile_all(context, &declared))?;

        for (descriptor, outcome) in declared.iter().zip(outcomes?) {
            log::debug!("{} '{}': {:?}", descriptor.kind(), descriptor.id(), outcome);
        }
        if !report.bindings.is_empty() {
            log::info!(
                "bindings changed: +{} -{}, {} installed",
                report.bindings.added.len(),
                report.bindings.removed.len(),
                self.view.installed_bindings()
            );
        }
        Ok(())
    }
}

/// Photo service stand-in: a few photos scattered around the query center
struct SyntheticProvider {
    name: String,
    max_radius_km: Option<f64>,
    spread: f64,
}

impl SyntheticProvider {
    fn new(name: &str, max_radius_km: Option<f64>, spread: f64) -> Self {
        Self {
            name: name.to_string(),
            max_radius_km,
            spread,
        }
    }
}

#[async_trait]
impl PhotoProvider for SyntheticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn max_radius_km(&self) -> Option<f64> {
        self.max_radius_km
    }

    async fn search(&self, query: &PhotoQuery) -> mapsync::Result<Vec<ProviderPhoto>> {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let photos = (0..6)
            .map(|i| {
                let offset = self.spread * (i as f64 - 2.5) / 2.5;
                ProviderPhoto {
                    url: format!("https://photos.invalid/{}/{}.jpg", self.name, i),
                    location: Some(LatLng::new(
                        query.center.lat + offset / 2.0,
                        query.center.lng + offset,
                    )),
                    owner: format!("{}-owner-{}", self.name, i / 2),
                }
            })
            .collect();
        Ok(photos)
    }
}
