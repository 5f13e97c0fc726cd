//! DAC (Digital-to-Analog Converter) output fed by DMA

use periph_core::{Error, Signal};

/// Analog output streaming a memory buffer through DMA
///
/// [`data_written`](Self::data_written) is emitted once the hardware has
/// written the buffer to the output.
pub trait AnalogOutDma {
    /// Start writing the buffer given to [`set_data`](Self::set_data)
    ///
    /// The outcome arrives asynchronously: `data_written` on completion,
    /// `error` on failure, including when no data was set.
    fn start(&mut self);

    /// Stop the output, aborting a running transfer
    fn stop(&mut self);

    /// Set the buffer written by the next [`start`](Self::start)
    ///
    /// The buffer is not copied. For 16-bit samples pass the little-endian
    /// bytes of the sample array; the byte length must be a multiple of the
    /// sample width. The buffer cannot be replaced while a transfer is
    /// running; [`stop`](Self::stop) first.
    fn set_data(&mut self, data: &'static [u8]);

    /// Emitted after a hardware write cycle finished
    fn data_written(&self) -> &Signal<()>;

    /// Emitted after a hardware error
    fn error(&self) -> &Signal<Error>;
}
