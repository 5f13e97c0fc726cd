//! STM32 DAC output fed by DMA

use periph_core::{error_codes, ClassId, Error, PeriphResult, Signal};
use periph_hal::analog_out_dma::AnalogOutDma;

use crate::sys::{DacAlignment, DacChannel, DacHandle, HalFailure};

error_codes! {
    /// Error codes of [`Stm32AnalogOutDma`]
    pub enum Stm32AnalogOutDmaError(ClassId::STM32_ANALOG_OUT_DMA) {
        /// `start` was called before any data was set
        StartNoData,
        StartHalError,
        StartHalBusy,
        StartHalTimeout,
        StopHalError,
        StopHalBusy,
        StopHalTimeout,
        /// Empty buffer or length not a multiple of the sample width
        SetDataInvalidLength,
        /// DMA transfer error reported by the interrupt
        TransferDmaError,
        /// DAC underrun reported by the interrupt
        TransferDmaUnderrun,
        /// `set_data` was called while the DMA stream reads the current buffer
        SetDataWhileRunning,
    }
}

impl Stm32AnalogOutDmaError {
    fn start(failure: HalFailure) -> Self {
        match failure {
            HalFailure::Error => Self::StartHalError,
            HalFailure::Busy => Self::StartHalBusy,
            HalFailure::Timeout => Self::StartHalTimeout,
        }
    }

    fn stop(failure: HalFailure) -> Self {
        match failure {
            HalFailure::Error => Self::StopHalError,
            HalFailure::Busy => Self::StopHalBusy,
            HalFailure::Timeout => Self::StopHalTimeout,
        }
    }
}

/// DAC configuration
#[derive(Debug, Clone)]
pub struct DacConfig {
    pub channel: DacChannel,
    pub alignment: DacAlignment,
    /// Whether the DMA stream restarts from the buffer start on completion
    pub circular: bool,
}

impl Default for DacConfig {
    fn default() -> Self {
        Self {
            channel: DacChannel::Channel1,
            alignment: DacAlignment::Right12,
            circular: false,
        }
    }
}

/// Transfer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmaState {
    Idle,
    Running,
}

/// Buffer handed to the DMA stream
#[derive(Debug, Clone, Copy)]
struct Transfer {
    data: &'static [u8],
    samples: usize,
}

/// [`AnalogOutDma`] implementation for STM32
///
/// The vendor conversion callbacks must be forwarded to
/// [`on_conversion_complete`](Self::on_conversion_complete),
/// [`on_dma_error`](Self::on_dma_error) and
/// [`on_dma_underrun`](Self::on_dma_underrun), typically through a
/// [`Shared`](periph_core::Shared) cell.
///
/// Calling `start` while a transfer is running is a no-op.
pub struct Stm32AnalogOutDma<'a, H: DacHandle> {
    handle: &'a mut H,
    config: DacConfig,
    transfer: Option<Transfer>,
    state: DmaState,
    data_written: Signal<()>,
    error: Signal<Error>,
}

impl<'a, H: DacHandle> Stm32AnalogOutDma<'a, H> {
    pub fn new(handle: &'a mut H, config: DacConfig) -> Self {
        Self {
            handle,
            config,
            transfer: None,
            state: DmaState::Idle,
            data_written: Signal::new(),
            error: Signal::new(),
        }
    }

    pub fn config(&self) -> &DacConfig {
        &self.config
    }

    pub fn state(&self) -> DmaState {
        self.state
    }

    /// Number of samples in the current buffer
    pub fn samples(&self) -> usize {
        self.transfer.map_or(0, |t| t.samples)
    }

    /// Conversion complete callback, called from interrupt context
    ///
    /// Completions arriving after [`stop`](AnalogOutDma::stop) are dropped.
    pub fn on_conversion_complete(&mut self) {
        if self.state != DmaState::Running {
            return;
        }
        if !self.config.circular {
            self.state = DmaState::Idle;
        }
        self.data_written.emit(());
    }

    /// DMA error callback, called from interrupt context
    pub fn on_dma_error(&mut self) {
        self.abort(Stm32AnalogOutDmaError::TransferDmaError);
    }

    /// DAC underrun callback, called from interrupt context
    pub fn on_dma_underrun(&mut self) {
        self.abort(Stm32AnalogOutDmaError::TransferDmaUnderrun);
    }

    fn abort(&mut self, code: Stm32AnalogOutDmaError) {
        self.state = DmaState::Idle;
        self.report(Err(Error::new(code)));
    }

    fn try_set_data(&mut self, data: &'static [u8]) -> PeriphResult<()> {
        if self.state == DmaState::Running {
            return Err(Error::new(Stm32AnalogOutDmaError::SetDataWhileRunning));
        }
        let stride = self.config.alignment.stride();
        if data.is_empty() || data.len() % stride != 0 {
            return Err(Error::new(Stm32AnalogOutDmaError::SetDataInvalidLength));
        }
        self.transfer = Some(Transfer {
            data,
            samples: data.len() / stride,
        });
        Ok(())
    }

    fn try_start(&mut self) -> PeriphResult<()> {
        let transfer = self
            .transfer
            .ok_or(Error::new(Stm32AnalogOutDmaError::StartNoData))?;
        if self.state == DmaState::Running {
            return Ok(());
        }
        self.handle
            .start_dma(
                self.config.channel,
                transfer.data,
                transfer.samples,
                self.config.alignment,
            )
            .into_result()
            .map_err(|f| Error::new(Stm32AnalogOutDmaError::start(f)))?;
        self.state = DmaState::Running;
        log::debug!(
            "dac {:?}: started, {} samples",
            self.config.channel,
            transfer.samples
        );
        Ok(())
    }

    fn try_stop(&mut self) -> PeriphResult<()> {
        if self.state == DmaState::Idle {
            return Ok(());
        }
        self.handle
            .stop_dma(self.config.channel)
            .into_result()
            .map_err(|f| Error::new(Stm32AnalogOutDmaError::stop(f)))?;
        self.state = DmaState::Idle;
        log::debug!("dac {:?}: stopped", self.config.channel);
        Ok(())
    }

    fn report(&self, result: PeriphResult<()>) {
        if let Err(error) = result {
            log::warn!("dac {:?}: {}", self.config.channel, error);
            self.error.emit(error);
        }
    }
}

impl<H: DacHandle> AnalogOutDma for Stm32AnalogOutDma<'_, H> {
    fn start(&mut self) {
        let result = self.try_start();
        self.report(result);
    }

    fn stop(&mut self) {
        let result = self.try_stop();
        self.report(result);
    }

    fn set_data(&mut self, data: &'static [u8]) {
        let result = self.try_set_data(data);
        self.report(result);
    }

    fn data_written(&self) -> &Signal<()> {
        &self.data_written
    }

    fn error(&self) -> &Signal<Error> {
        &self.error
    }
}
