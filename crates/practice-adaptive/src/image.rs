use crate::decision::LoadingDecision;
use crate::visibility::{
    IntersectionEntry, ObserverHandle, ObserverOptions, VisibilitySignal, VisibilitySubscription,
};

pub const DEFAULT_SIZES: &str = "100vw";
pub const PLACEHOLDER_CLASS: &str = "bg-gray-200 animate-pulse";
pub const TRANSITION_CLASS: &str = "transition-opacity duration-300";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageProps {
    pub source: String,
    pub alt_text: String,
    pub class_name: Option<String>,
    pub priority: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sizes_hint: String,
    pub quality_override: Option<u8>,
}

impl ImageProps {
    pub fn new(source: impl Into<String>, alt_text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            alt_text: alt_text.into(),
            class_name: None,
            priority: false,
            width: None,
            height: None,
            sizes_hint: DEFAULT_SIZES.to_string(),
            quality_override: None,
        }
    }

    #[must_use]
    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn sizes_hint(mut self, sizes: impl Into<String>) -> Self {
        self.sizes_hint = sizes.into();
        self
    }

    #[must_use]
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality_override = Some(quality);
        self
    }

    /// Override when set and non-zero, else the decision's quality.
    pub fn effective_quality(&self, decision: &LoadingDecision) -> u8 {
        self.quality_override
            .filter(|quality| *quality != 0)
            .unwrap_or(decision.image_quality)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageFormat {
    Avif,
    Webp,
}

impl ImageFormat {
    /// Preference order of the `<source>` elements.
    pub const PREFERRED: [ImageFormat; 2] = [ImageFormat::Avif, ImageFormat::Webp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Avif => "image/avif",
            Self::Webp => "image/webp",
        }
    }
}

/// `<source>?format=..&quality=..[&w=..][&h=..]`; zero or missing dimensions are left out.
pub fn candidate_url(
    source: &str,
    format: ImageFormat,
    quality: u8,
    width: Option<u32>,
    height: Option<u32>,
) -> String {
    let mut params = vec![
        ("format", format.as_str().to_string()),
        ("quality", quality.to_string()),
    ];
    if let Some(width) = width.filter(|w| *w != 0) {
        params.push(("w", width.to_string()));
    }
    if let Some(height) = height.filter(|h| *h != 0) {
        params.push(("h", height.to_string()));
    }

    match serde_urlencoded::to_string(&params) {
        Ok(query) => format!("{source}?{query}"),
        Err(err) => {
            log::warn!("failed to encode image parameters for {source}: {err}");
            source.to_string()
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Loading {
    Eager,
    Lazy,
}

impl Loading {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eager => "eager",
            Self::Lazy => "lazy",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PictureSource {
    pub srcset: String,
    pub mime_type: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImgElement {
    pub src: String,
    pub alt: String,
    pub class_name: String,
    pub loading: Loading,
    pub decoding: &'static str,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub sizes: String,
}

/// What the element renders in its current state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageView {
    /// Sized, `aria-hidden` block shown until the image is in view.
    Placeholder {
        class_name: String,
        width: Option<u32>,
        height: Option<u32>,
    },
    Picture {
        sources: Vec<PictureSource>,
        img: ImgElement,
    },
}

/// State of one adaptive image element from mount to unmount.
#[derive(Debug)]
pub struct OptimizedImage<H: ObserverHandle> {
    props: ImageProps,
    quality: u8,
    in_view: bool,
    loaded: bool,
    fell_back: bool,
    subscription: Option<VisibilitySubscription<H>>,
}

impl<H: ObserverHandle> OptimizedImage<H> {
    /// Mount the element. `observe` is called only when the image must wait for visibility.
    pub fn mount<F>(props: ImageProps, decision: &LoadingDecision, observe: F) -> Self
    where
        F: FnOnce(&ObserverOptions) -> H,
    {
        let quality = props.effective_quality(decision);
        let in_view = props.priority || decision.preload_images;
        let subscription =
            (!in_view).then(|| VisibilitySubscription::new(observe(&ObserverOptions::default())));

        Self {
            props,
            quality,
            in_view,
            loaded: false,
            fell_back: false,
            subscription,
        }
    }

    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn is_observing(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(VisibilitySubscription::is_active)
    }

    /// Observer callback. Returns true on the transition into view.
    pub fn on_intersection(&mut self, entry: &IntersectionEntry) -> bool {
        let fired = self
            .subscription
            .as_mut()
            .and_then(|subscription| subscription.on_entry(entry));
        match fired {
            Some(VisibilitySignal::BecameVisible) => {
                self.subscription = None;
                self.in_view = true;
                true
            }
            None => false,
        }
    }

    pub fn on_load(&mut self) {
        self.loaded = true;
    }

    /// Any load error degrades to the original source and counts as loaded.
    pub fn on_error(&mut self) {
        log::debug!("optimized variants failed, using {}", self.props.source);
        self.fell_back = true;
        self.loaded = true;
    }

    pub fn unmount(mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.teardown();
        }
    }

    pub fn view(&self) -> ImageView {
        let props = &self.props;
        if !self.in_view {
            return ImageView::Placeholder {
                class_name: join_classes(&[
                    PLACEHOLDER_CLASS,
                    props.class_name.as_deref().unwrap_or(""),
                ]),
                width: props.width,
                height: props.height,
            };
        }

        let sources = if self.fell_back {
            Vec::new()
        } else {
            ImageFormat::PREFERRED
                .iter()
                .map(|format| PictureSource {
                    srcset: candidate_url(
                        &props.source,
                        *format,
                        self.quality,
                        props.width,
                        props.height,
                    ),
                    mime_type: format.mime_type(),
                })
                .collect()
        };

        let opacity = if self.loaded { "opacity-100" } else { "opacity-0" };
        ImageView::Picture {
            sources,
            img: ImgElement {
                src: props.source.clone(),
                alt: props.alt_text.clone(),
                class_name: join_classes(&[
                    TRANSITION_CLASS,
                    opacity,
                    props.class_name.as_deref().unwrap_or(""),
                ]),
                loading: if props.priority {
                    Loading::Eager
                } else {
                    Loading::Lazy
                },
                decoding: "async",
                width: props.width,
                height: props.height,
                sizes: props.sizes_hint.clone(),
            },
        }
    }
}

fn join_classes(classes: &[&str]) -> String {
    classes
        .iter()
        .map(|class| class.trim())
        .filter(|class| !class.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
