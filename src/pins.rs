//! Pin assignments for the coordinator board and the remote room nodes.
//!
//! Single source of truth: every driver and the dispatcher reference this
//! module rather than hard-coding line numbers.  Actuator output pins on the
//! remote nodes are configuration (`ActuatorPins`) because they differ
//! between node revisions; the sensor lines below do not.

// ---------------------------------------------------------------------------
// Coordinator radio (XBee on UART1)
// ---------------------------------------------------------------------------

/// UART TX towards the XBee DIN pin.
pub const XBEE_UART_TX_GPIO: i32 = 17;
/// UART RX from the XBee DOUT pin.
pub const XBEE_UART_RX_GPIO: i32 = 18;

// ---------------------------------------------------------------------------
// Coordinator keypad (active-low, internal pull-ups)
// ---------------------------------------------------------------------------

/// Keypad buttons in identity-code order: button `i` enters code `i + 1`.
pub const KEYPAD_GPIOS: [i32; 4] = [4, 5, 6, 7];

/// Intrusion alarm sounder (active HIGH).
pub const ALARM_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// Remote node sensor lines (as enabled by the provisioning frames)
// ---------------------------------------------------------------------------

/// AD0: light-dependent resistor.
pub const NODE_LIGHT_ADC: u8 = 0;
/// AD1: TMP36 temperature sensor.
pub const NODE_TEMP_ADC: u8 = 1;
/// AD2: threshold potentiometer.
pub const NODE_POT_ADC: u8 = 2;
/// DIO3: PIR presence sensor.
pub const NODE_PIR_DIO: u8 = 3;
/// DIO4: threshold push-button.
pub const NODE_BUTTON_DIO: u8 = 4;
