//! Decode adapter over the rxing barcode library.

use rxing::{BarcodeFormat, Exceptions};

use crate::sampler::PixelBuffer;
use crate::traits::{DecodedSymbol, Result, ScanConfig, ScanError, SymbolDecoder, Symbology};

/// One decoder instance per scan session.
///
/// Constructed once before the first decode and discarded when the session
/// terminates; instances are not reused across sessions.
pub struct RxingDecoder {
    config: ScanConfig,
}

impl RxingDecoder {
    /// Configure a decoder for the session's enabled symbologies.
    #[must_use]
    pub const fn new(config: ScanConfig) -> Self {
        Self { config }
    }
}

impl SymbolDecoder for RxingDecoder {
    fn decode(&mut self, buffer: &PixelBuffer) -> Result<Vec<DecodedSymbol>> {
        let results = match rxing::helpers::detect_multiple_in_luma(
            buffer.data().to_vec(),
            buffer.width(),
            buffer.height(),
        ) {
            Ok(results) => results,
            // "Nothing in this frame" is a normal outcome, not a fault.
            Err(Exceptions::NotFoundException(_)) => return Ok(Vec::new()),
            Err(err) => return Err(ScanError::DecodeFailure(err.to_string())),
        };

        Ok(results
            .into_iter()
            .map(|result| DecodedSymbol {
                symbology: symbology_of(result.getBarcodeFormat()),
                text: result.getText().to_owned(),
            })
            .filter(|symbol| self.config.allows(symbol.symbology))
            .collect())
    }
}

/// Map the library's format tag onto the session vocabulary.
const fn symbology_of(format: &BarcodeFormat) -> Symbology {
    match format {
        BarcodeFormat::QR_CODE => Symbology::QrCode,
        BarcodeFormat::CODE_128 => Symbology::Code128,
        _ => Symbology::Other,
    }
}
