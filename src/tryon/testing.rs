// Scripted generation service used by the pipeline tests

use async_trait::async_trait;
use gemini::{GenerateRequest, GenerateResponse, GenerationService, InlineImage, ServiceError};
use std::sync::Mutex;

type Responder = dyn Fn(usize, &GenerateRequest) -> gemini::Result<GenerateResponse> + Send + Sync;

/// Answers every request with a scripted response and records what it saw
pub struct ScriptedService {
    configured: bool,
    responder: Box<Responder>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl ScriptedService {
    /// Responder receives the zero-based call index and the request
    pub fn new(
        responder: impl Fn(usize, &GenerateRequest) -> gemini::Result<GenerateResponse>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Self {
            configured: true,
            responder: Box::new(responder),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Text for analysis calls, a tiny PNG for image calls
    pub fn happy() -> Self {
        Self::new(|_, req| {
            if req.modalities.is_some() {
                Ok(GenerateResponse::with_image(png_image()))
            } else {
                Ok(GenerateResponse::with_text("analysis"))
            }
        })
    }

    pub fn failing() -> Self {
        Self::new(|_, _| Err(ServiceError::Network("connection refused".into())))
    }

    pub fn unconfigured() -> Self {
        let mut service = Self::happy();
        service.configured = false;
        service
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn generate(&self, request: &GenerateRequest) -> gemini::Result<GenerateResponse> {
        let index = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len() - 1
        };
        (self.responder)(index, request)
    }
}

/// A real 4x4 PNG so decoding paths work
pub fn png_bytes() -> Vec<u8> {
    let canvas = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 30, 30, 255]));
    compositor::encode_png(&canvas).unwrap()
}

pub fn png_image() -> InlineImage {
    InlineImage::new("image/png", png_bytes())
}
