//! User-facing guidance text
//!
//! Every fatal path prints a human-readable cause plus one of these
//! guidance blocks before the process exits.

pub const MSG_WELCOME: &str = "\
Welcome to the romflash installer!

This tool will flash the latest release onto your device. Your device
must be connected over USB with USB debugging enabled for the whole run.";

pub const MSG_CONSENT_PROMPT: &str = "Are you ready to install? (yes/no): ";

pub const MSG_INCOMPLETE_TOOLS: &str = "\
The adb/fastboot tools could not be run. If you extracted the installer
from a zip, make sure the whole archive was extracted next to the
executable.";

pub const MSG_ADB_ISSUE: &str = "\
Your device could not be reached over adb. Check that:

  1. The device is connected over USB and powered on.
  2. USB debugging is enabled in developer settings.
  3. You accepted the debugging authorization dialog on-device.";

pub const MSG_FIX_PERMS: &str = "\
The USB device node is not readable by your user. On Linux, install the
vendor udev rules (or run once with elevated privileges), then re-plug
the cable and re-run the installer.";

pub const MSG_FASTBOOT_NO_DEVICE: &str = "\
No device is visible in fastboot mode. Keep the cable connected and make
sure the device shows its bootloader screen, then re-run the installer.";

pub const MSG_SIDELOAD_PROMPT: &str = "\
On the device, choose \"Install from USB\" in the recovery menu and tap
OK to confirm. Press Enter here once the device is in sideload mode: ";

pub const MSG_FASTBOOT_RETURN_PROMPT: &str = "\
When the factory flash completes, reboot the device back into the
bootloader. Press Enter here once the device is in fastboot mode: ";

pub const MSG_UNLOCK_SUCCESS: &str = "\
The bootloader is now unlocked and your device is rebooting. Unlocking
wipes user data, so the device will boot fresh. Re-run this installer to
continue with flashing.";

pub const MSG_SUCCESS: &str = "\
Installation complete! Your device will now reboot into its new system.";

pub const MSG_MANUAL_REBOOT: &str = "\
Please reboot your device manually: in the recovery menu go to
Reboot > System > Do Not Install.";
