use objc2::rc::Retained;
use objc2_av_foundation::{
    AVAuthorizationStatus, AVCaptureDevice, AVCaptureDeviceInput, AVCaptureSession,
    AVCaptureVideoDataOutput, AVMediaTypeVideo,
};

use super::error::CameraError;
use super::session::CaptureSession;
use super::CaptureBackend;

/// Opens the system default camera through AVFoundation.
pub struct AvFoundationBackend;

pub struct AvCaptureSession {
    session: Retained<AVCaptureSession>,
}

// SAFETY: AVCaptureSession is documented as safe to start and stop from any
// thread, and it is only ever touched through `stop` once stored here.
unsafe impl Send for AvCaptureSession {}

impl CaptureSession for AvCaptureSession {
    fn stop(&self) {
        unsafe { self.session.stopRunning() };
        tracing::info!("Camera: capture session stopped");
    }
}

impl CaptureBackend for AvFoundationBackend {
    type Session = AvCaptureSession;

    fn start_default_camera(&self) -> Result<AvCaptureSession, CameraError> {
        let media_type = unsafe { AVMediaTypeVideo.ok_or(CameraError::MediaTypeUnavailable)? };

        let device = unsafe { AVCaptureDevice::defaultDeviceWithMediaType(media_type) };
        let status = unsafe { AVCaptureDevice::authorizationStatusForMediaType(media_type) };
        let device = check_access(device, status)?;
        let device_name = unsafe { device.localizedName() }.to_string();
        tracing::info!("Camera: found default device {}", device_name);

        let input = unsafe { AVCaptureDeviceInput::deviceInputWithDevice_error(&device) }
            .map_err(|e| CameraError::OpenFailed(e.localizedDescription().to_string()))?;
        let output = unsafe { AVCaptureVideoDataOutput::new() };

        let session = unsafe { AVCaptureSession::new() };
        unsafe {
            if !session.canAddInput(&input) {
                return Err(CameraError::SessionRejected("input"));
            }
            if !session.canAddOutput(&output) {
                return Err(CameraError::SessionRejected("output"));
            }
            session.addInput(&input);
            session.addOutput(&output);
            session.startRunning();
        }
        tracing::info!("Camera: capture session running on {}", device_name);

        Ok(AvCaptureSession { session })
    }
}

/// Device presence is checked before authorization, since looking up the
/// default device needs no permission.
fn check_access<D>(device: Option<D>, status: AVAuthorizationStatus) -> Result<D, CameraError> {
    let device = device.ok_or(CameraError::NoDevice)?;
    if status == AVAuthorizationStatus::Denied || status == AVAuthorizationStatus::Restricted {
        return Err(CameraError::AccessDenied(status.0));
    }
    if status == AVAuthorizationStatus::NotDetermined {
        tracing::info!("Camera: permission not determined, the system will prompt");
    }
    Ok(device)
}
